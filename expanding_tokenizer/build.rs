// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    expansion: ExpansionLimits,
    matcher: MatcherLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_length: usize,
    max_comment_length: usize,
}

#[derive(serde::Deserialize)]
struct ExpansionLimits {
    max_expansion_depth: u32,
}

#[derive(serde::Deserialize)]
struct MatcherLimits {
    max_pending_tokens: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    default_log_level: u8,
    enable_structured_logging: bool,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=EXPANDING_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=EXPANDING_CONFIG_DIR");

    let profile = env::var("EXPANDING_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("EXPANDING_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of this crate
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_EXPANSION_DEPTH: u32 = 1_024;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("max_file_size exceeds absolute maximum");
    }

    if config.expansion.max_expansion_depth == 0
        || config.expansion.max_expansion_depth > ABSOLUTE_MAX_EXPANSION_DEPTH
    {
        panic!("max_expansion_depth must be between 1 and {}", ABSOLUTE_MAX_EXPANSION_DEPTH);
    }

    if config.lexical.max_token_length == 0 || config.matcher.max_pending_tokens == 0 {
        panic!("max_token_length and max_pending_tokens must be positive");
    }

    if config.logging.default_log_level > 3 {
        panic!("default_log_level must be 0 (error) to 3 (debug)");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
    }}

    pub mod lexical {{
        pub const MAX_TOKEN_LENGTH: usize = {};
        pub const MAX_COMMENT_LENGTH: usize = {};
    }}

    pub mod expansion {{
        pub const MAX_EXPANSION_DEPTH: u32 = {};
    }}

    pub mod matcher {{
        pub const MAX_PENDING_TOKENS: usize = {};
    }}

    pub mod logging {{
        pub const DEFAULT_LOG_LEVEL: u8 = {};
        pub const ENABLE_STRUCTURED_LOGGING: bool = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.lexical.max_token_length,
        config.lexical.max_comment_length,
        config.expansion.max_expansion_depth,
        config.matcher.max_pending_tokens,
        config.logging.default_log_level,
        config.logging.enable_structured_logging,
    );

    fs::write(output_path, constants_code).unwrap();
}
