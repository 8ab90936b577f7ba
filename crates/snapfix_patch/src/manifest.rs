use camino::Utf8Path;

const MANIFEST_FILE_NAME: &str = "Cargo.toml";

/// The edition cargo uses for a package that does not declare one.
pub const DEFAULT_EDITION: &str = "2015";

/// Finds the Rust edition a source file is compiled with.
///
/// Walks up from `path` to the closest `Cargo.toml` with a `[package]` table.
/// An `edition.workspace = true` key is followed further up to the workspace
/// root's `[workspace.package]`. Returns `None` when no package manifest is
/// found or a manifest cannot be read.
pub fn manifest_edition(path: &Utf8Path) -> Option<String> {
    let mut inherits = false;

    for directory in path.ancestors().skip(1) {
        let manifest_path = directory.join(MANIFEST_FILE_NAME);
        let Ok(text) = std::fs::read_to_string(&manifest_path) else {
            continue;
        };
        let manifest = match text.parse::<toml::Table>() {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::debug!(path = %manifest_path, "Ignoring invalid manifest: {err}");
                return None;
            }
        };

        if inherits {
            let edition = manifest
                .get("workspace")
                .and_then(|workspace| workspace.get("package"))
                .and_then(|package| package.get("edition"));
            if let Some(edition) = edition.and_then(toml::Value::as_str) {
                return Some(edition.to_string());
            }
            if manifest.contains_key("workspace") {
                return Some(DEFAULT_EDITION.to_string());
            }
            continue;
        }

        let Some(package) = manifest.get("package") else {
            continue;
        };
        match package.get("edition") {
            Some(toml::Value::String(edition)) => {
                tracing::debug!(path = %manifest_path, "Using edition {edition}");
                return Some(edition.clone());
            }
            Some(toml::Value::Table(edition))
                if edition.get("workspace").and_then(toml::Value::as_bool) == Some(true) =>
            {
                inherits = true;
                // The package manifest can also be the workspace root.
                let own = manifest
                    .get("workspace")
                    .and_then(|workspace| workspace.get("package"))
                    .and_then(|package| package.get("edition"))
                    .and_then(toml::Value::as_str);
                if let Some(edition) = own {
                    return Some(edition.to_string());
                }
            }
            _ => return Some(DEFAULT_EDITION.to_string()),
        }
    }

    None
}
