//! Manifest templates for new projects.

use std::path::Path;

use clap::ValueEnum;

use super::ConfigError;

/// Starting manifest written by the `new` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Template {
    /// Common defaults with a typical platform selection
    Default,
    /// Every format and architecture enabled
    All,
    /// Every value blank, to be filled in by hand
    Empty,
}

const DEFAULT: &str = r#"[application]
name = "app"
version = "1.0.0"
url = ""
license = ""
description = ""
long_description = ""
gui = false

[desktop_entry]
name = "App"
icon = "./icon.png"
categories = ["Utility"]

[build]
target = "."
flags = ""
platforms = [
    "linux/amd64",
    "windows/amd64",
    "darwin/arm64"
]

[maintainer]
name = ""
email = ""

[deb]
package = false
architectures = ["amd64"]

[rpm]
package = false
build_src = false
architectures = ["amd64"]

[pkg]
package = true
architectures = ["amd64"]

[appimage]
package = true
architectures = ["amd64"]
custom_apprun = ""
"#;

const ALL: &str = r#"[application]
name = "app"
version = "1.0.0"
url = ""
license = ""
description = ""
long_description = ""
gui = false

[desktop_entry]
name = "App"
icon = "./icon.png"
categories = ["Utility"]

[build]
target = "."
flags = ""
platforms = [
    "linux/amd64",
    "linux/386",
    "linux/arm",
    "linux/arm64",
    "windows/amd64",
    "darwin/amd64",
    "darwin/arm64"
]

[maintainer]
name = ""
email = ""

[deb]
package = true
architectures = ["amd64", "386", "arm", "arm64"]

[rpm]
package = true
build_src = true
architectures = ["amd64", "386", "arm", "arm64"]

[pkg]
package = true
architectures = ["amd64"]

[appimage]
package = true
architectures = ["amd64"]
custom_apprun = ""
"#;

const EMPTY: &str = r#"[application]
name = ""
version = ""
url = ""
license = ""
description = ""
long_description = ""
gui = false

[desktop_entry]
name = ""
icon = ""
categories = []

[build]
target = "."
flags = ""
platforms = []

[maintainer]
name = ""
email = ""

[deb]
package = false
architectures = []

[rpm]
package = false
build_src = false
architectures = []

[pkg]
package = false
architectures = []

[appimage]
package = false
architectures = []
custom_apprun = ""
"#;

impl Template {
    /// The manifest text for this template
    pub fn contents(self) -> &'static str {
        match self {
            Template::Default => DEFAULT,
            Template::All => ALL,
            Template::Empty => EMPTY,
        }
    }

    /// Writes the template to `path`, refusing to overwrite an existing file
    pub fn write(self, path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        std::fs::write(path, self.contents()).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("make.toml");

        Template::Default.write(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            Template::Default.contents()
        );

        assert!(matches!(
            Template::Empty.write(&path),
            Err(ConfigError::AlreadyExists(_))
        ));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            Template::Default.contents()
        );
    }
}
