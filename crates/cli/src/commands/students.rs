//! `companion students [KEY]`: list the roster or show one profile.

use companion_config::AppConfig;
use companion_core::StudentDirectory;

pub async fn run(key: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let directory = config.load_directory()?;

    match key {
        Some(key) => print_student(&directory, &key)?,
        None => {
            println!("🎓 Students ({})", directory.len());
            for entry in directory.selector() {
                println!("  {:<12} {}", entry.key, entry.display_name);
            }
        }
    }

    Ok(())
}

fn print_student(directory: &StudentDirectory, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let student = directory.get(key)?;
    let details = &student.academic_details;

    println!("📘 Student Profile");
    println!("  ID:          {}", student.id);
    println!("  Name:        {}", student.name);
    println!("  Class:       {}", details.class_label);
    println!("  Department:  {}", details.department);
    println!("  Year:        {}", details.year);

    println!("\n📊 Subject Grades");
    for subject in &student.subjects {
        println!("  {:<20} {:>3}/100", subject.name, subject.grade);
    }

    if !student.strengths.is_empty() {
        println!("\n  Strengths:");
        for s in &student.strengths {
            println!("    - {s}");
        }
    }
    if !student.areas_for_improvement.is_empty() {
        println!("\n  Areas for improvement:");
        for a in &student.areas_for_improvement {
            println!("    - {a}");
        }
    }
    println!(
        "\n  Learning style: {}. {}",
        student.learning_style.kind, student.learning_style.description
    );

    Ok(())
}
