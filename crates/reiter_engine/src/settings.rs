use std::path::PathBuf;

/// How to launch sattel and how much progress traffic to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SattelSettings {
    pub program: PathBuf,
    /// Arguments placed before the job arguments, e.g. a script path for an interpreter.
    pub program_args: Vec<String>,
    /// Crawler configuration handed to sattel, if any.
    pub config_file: Option<PathBuf>,
    /// Forward every n-th `advance` per bar; 1 forwards all of them.
    pub advance_stride: u32,
}

impl Default for SattelSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("sattel"),
            program_args: Vec::new(),
            config_file: None,
            advance_stride: 100,
        }
    }
}
