use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("vertito")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Vertito Contributors")
        .about("Extract, chunk and translate articles")
        .arg(clap::arg!([INPUT] "Local HTML file, or '-' for stdin"))
        .arg(clap::arg!(--text <TEXT> "Plain text to transform instead of an HTML page"))
        .arg(clap::arg!(-l --lang <TARGET> "Target: a language code (hi-IN) or transliterate-<code>").default_value("hi-IN"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (markup, text, json)")
                .value_name("FORMAT")
                .default_value("markup")
                .value_parser(["markup", "text", "json"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--budget <CHARS> "Maximum characters per chunk").default_value("1000"))
        .arg(clap::arg!(--endpoint <URL> "Base URL of the transform API"))
        .arg(clap::arg!(--api_key <KEY> "API subscription key"))
        .arg(clap::arg!(--source_lang <CODE> "Language code of the source text").default_value("en-IN"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--extract_only "Stop after extraction and chunking; no API calls are made"))
        .arg(clap::arg!(--bare "Emit the display markup without the wrapping <div>"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "vertito", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "vertito", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "vertito", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "vertito", &completions_dir).unwrap();

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
