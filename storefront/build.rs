use common::yaml_include::load_yaml_with_includes;
use std::{error::Error, fs, io::Write, path::PathBuf};

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=config");
    println!("cargo:rerun-if-env-changed=STOREFRONT_ENV");

    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());
    let env = std::env::var("STOREFRONT_ENV").unwrap_or_else(|_| "dev".to_string());

    // target/<profile>/config, or OUT_DIR when the build runs outside a target directory
    let total_config_dir = out_dir
        .ancestors()
        .find(|p| p.ends_with("target"))
        .map(|target| target.join(&profile).join("config"))
        .unwrap_or_else(|| out_dir.join("config"));
    let total_config_file_name = total_config_dir.join("total_config.yaml");

    let path = manifest_dir.join("config").join(format!("{}.yaml", env));
    println!("cargo:warning=Loading config env {:?} profile {:?}", env, profile);
    let config_yaml = load_yaml_with_includes(&path)?;

    let mut out_str = String::new();
    {
        let mut emitter = yaml_rust2::YamlEmitter::new(&mut out_str);
        emitter.dump(&config_yaml)?
    }

    fs::create_dir_all(&total_config_dir)?;
    fs::File::create(&total_config_file_name)?.write_all(out_str.as_bytes())?;
    println!("cargo:warning=Writing config to {:?}", total_config_file_name);

    Ok(())
}
