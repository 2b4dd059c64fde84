use std::path::PathBuf;

use rpcgen::{create_generator, validate, AppDefinition, GeneratorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = PathBuf::from("fixtures/app.json");
    println!("cargo:rerun-if-changed={}", fixture.display());

    let app = AppDefinition::load(&fixture)?;
    validate::validate(&app)?;

    let config = GeneratorConfig {
        root_service: "Test".to_string(),
        rust_inner_attributes: false,
        ..GeneratorConfig::default()
    };
    let code = create_generator(&config)?.generate(&app)?;

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    std::fs::write(out_dir.join("generated.rs"), code)?;
    Ok(())
}
