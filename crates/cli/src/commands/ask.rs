//! `companion ask --student KEY QUESTION`: one personalized answer.

use companion_agent::Outcome;

pub async fn run(
    student: &str,
    question: &str,
    show_material: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if question.trim().is_empty() {
        return Err("question must not be empty".into());
    }

    let (_config, companion) = super::build_companion().await?;

    eprintln!("🔎 Retrieving module content...");
    let result = companion.ask(student, question).await?;

    match result.outcome {
        Outcome::NoMaterialFound { message } => {
            println!("❌ {message}");
        }
        Outcome::Answered { answer, material } => {
            println!("✅ Personalized Answer:\n");
            println!("{answer}");
            if show_material {
                println!("\n📚 Source Material:\n");
                println!("{material}");
            }
        }
    }

    Ok(())
}
