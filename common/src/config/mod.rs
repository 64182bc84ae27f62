mod error;
pub use self::error::Error;

use config::{Config, Environment, File};
use std::{env, path::Path};
use tracing::trace;

use crate::err_context::ErrorContextExt;

static DEFAULT_ENV_NAME: &str = "default";
static LOCAL_ENV_NAME: &str = "local";

/// Environment variable selecting the configuration profile. It takes
/// precedence over the profile given as argument.
pub static PROFILE_ENV_VAR: &str = "TOKEN_ALERT_PROFILE";

/// Builds a layered configuration.
///
/// For each sub directory of `root_dir`, we read, in order:
/// * the `default` file (mandatory),
/// * the profile file, if a profile is given either through `TOKEN_ALERT_PROFILE`
///   or the `profile` argument,
/// * a `local` file, which should not be checked in.
///
/// Environment variables starting with `{prefix}__` are merged next, and
/// finally the `key=value` overrides (usually from the command line).
pub fn merge_configuration<
    'a,
    R: Into<Option<&'a str>> + Clone,
    P: Into<Option<&'a str>>,
    D: AsRef<str>,
>(
    root_dir: &Path,
    sub_dirs: &[D],
    profile: R,
    prefix: P,
    overrides: Vec<String>,
) -> Result<Config, Error> {
    let profile = env::var(PROFILE_ENV_VAR)
        .ok()
        .or_else(|| profile.into().map(String::from));

    let mut builder = sub_dirs.iter().fold(Config::builder(), |builder, sub_dir| {
        let dir_path = root_dir.join(sub_dir.as_ref());

        let default_path = dir_path.join(DEFAULT_ENV_NAME);
        trace!(
            "Reading default configuration from: {}",
            default_path.display()
        );
        let builder = builder.add_source(File::from(default_path));

        let builder = match profile.as_deref() {
            Some(profile) => {
                let profile_path = dir_path.join(profile);
                trace!(
                    "Reading profile configuration from: {}",
                    profile_path.display()
                );
                builder.add_source(File::from(profile_path).required(false))
            }
            None => builder,
        };

        let local_path = dir_path.join(LOCAL_ENV_NAME);
        trace!("Reading local configuration from: {}", local_path.display());
        builder.add_source(File::from(local_path).required(false))
    });

    if let Some(prefix) = prefix.into() {
        let environment = Environment::with_prefix(prefix)
            .prefix_separator("__")
            .separator("__");
        builder = builder.add_source(environment)
    }

    if !overrides.is_empty() {
        builder = builder.add_source(config_from_args(overrides)?)
    }

    builder
        .build()
        .context("Could not merge configuration")
        .map_err(|err| err.into())
}

// Create a new configuration source from a list of assignments key=value.
// Each assignment is checked on its own, so that an error names it.
fn config_from_args(args: impl IntoIterator<Item = String>) -> Result<Config, Error> {
    let builder = args
        .into_iter()
        .try_fold(Config::builder(), |builder, assignment| {
            let source = Config::builder()
                .add_source(File::from_str(&assignment, config::FileFormat::Toml))
                .build()
                .map_err(|source| Error::Override {
                    assignment: assignment.clone(),
                    source,
                })?;
            Ok::<_, Error>(builder.add_source(source))
        })?;
    builder
        .build()
        .context("Could not build configuration from args")
        .map_err(|err| err.into())
}
