//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Nate Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[model]
# name = "gemini-2.0-flash"
# max_tokens = 4096          # 1-65536
# temperature = 0.7          # 0.0-2.0
# api_key_env = "GEMINI_API_KEY"
# api_key_file = "../API_KEY.txt"
# timeout_secs = 120         # 1-600

[session]
# system_prompt_path = "prompt.txt"
# max_tool_rounds = 10       # 1-50
# tool_errors = "abort"      # abort | report
# seed_name = "test_df"

[data_source]
# base_url = "https://api.inaturalist.org/v1"
# per_page = 200             # 1-200
# max_observations = 200     # 1-10000
# timeout_secs = 30          # 1-600

[logging]
# level = "info"             # trace, debug, info, warn, error
"##
    .to_string()
}
