use anyhow::ensure;
use anyhow::Context;
use std::path::Path;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "m3u.toml";

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    #[serde(rename = "output-directory", default)]
    pub output_directory: Option<PathBuf>,

    #[serde(default)]
    pub logging: ConfigLogging,
}

impl Config {
    /// Load the config at the given path.
    ///
    /// If no path is given, the default path is used if it exists.
    /// Otherwise, the default config is returned.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_path(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                let exists = path.try_exists().with_context(|| {
                    format!("failed to check if \"{}\" exists", path.display())
                })?;

                if exists {
                    Self::load_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate a config.
    pub fn load_path<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to load config file at \"{}\"", path.display()))?;
        let config: Self = toml::from_str(&data)
            .with_context(|| format!("failed to parse config file at \"{}\"", path.display()))?;

        if let Some(output_directory) = config.output_directory.as_ref() {
            let output_directory_exists = output_directory.try_exists().with_context(|| {
                format!(
                    "failed to check if the output directory path \"{}\" exists",
                    output_directory.display()
                )
            })?;
            ensure!(
                output_directory_exists,
                "the output directory path \"{}\" does not exist",
                output_directory.display()
            );
        }

        Ok(config)
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ConfigLogging {
    #[serde(default)]
    pub directives: Vec<String>,
}
