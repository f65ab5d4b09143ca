//! Placeholder source-tree generation.
//!
//! A clone reserves the target application name by pushing a minimal app
//! pinned to the source's buildpack before the real bits are copied over.
//! Each supported runtime family gets the smallest source tree its buildpack
//! can stage without intervention; anything unrecognized falls back to a
//! static page plus a `Staticfile` staging-root descriptor.

use log::{info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::CloneError;

/// The runtime identity of an application: the raw buildpack label as the
/// platform reports it, plus the family derived from it.
///
/// Equality is on the raw label. Two apps staged with `java_buildpack` and
/// `java_buildpack_offline` are the same family but distinct identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeIdentity {
    label: String,
    family: RuntimeFamily,
}

/// Closed set of runtime families with a generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeFamily {
    Java,
    NodeJs,
    Python,
    Go,
    Php,
    Ruby,
    Static,
}

impl RuntimeIdentity {
    /// Derive an identity from a buildpack label. Unrecognized labels map to
    /// the static family.
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let family = match label.to_lowercase().as_str() {
            "java_buildpack" | "java_buildpack_offline" => RuntimeFamily::Java,
            "nodejs_buildpack" => RuntimeFamily::NodeJs,
            "python_buildpack" => RuntimeFamily::Python,
            "go_buildpack" => RuntimeFamily::Go,
            "php_buildpack" => RuntimeFamily::Php,
            "ruby_buildpack" => RuntimeFamily::Ruby,
            "staticfile_buildpack" => RuntimeFamily::Static,
            other => {
                warn!("unknown buildpack '{}', using static placeholder", other);
                RuntimeFamily::Static
            }
        };
        Self { label, family }
    }

    /// The raw buildpack label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The derived runtime family
    pub fn family(&self) -> RuntimeFamily {
        self.family
    }
}

impl fmt::Display for RuntimeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A locally generated placeholder source tree.
///
/// The backing temporary directory belongs to exactly one clone invocation.
/// `cleanup` removes it explicitly and only logs failures; if cleanup is
/// never reached (a panic mid-pipeline), dropping the artifact removes the
/// directory as a last resort.
pub struct PlaceholderArtifact {
    dir: TempDir,
    identity: RuntimeIdentity,
}

impl PlaceholderArtifact {
    /// Path of the generated source tree
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The identity this artifact was generated for
    pub fn identity(&self) -> &RuntimeIdentity {
        &self.identity
    }

    /// Remove the backing directory. Failures are logged, never raised, so
    /// cleanup cannot mask an earlier pipeline error.
    pub fn cleanup(self) {
        let path: PathBuf = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => info!("removed placeholder directory {}", path.display()),
            Err(e) => warn!(
                "failed to remove placeholder directory {}: {}",
                path.display(),
                e
            ),
        }
    }
}

impl fmt::Debug for PlaceholderArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceholderArtifact")
            .field("path", &self.dir.path())
            .field("identity", &self.identity)
            .finish()
    }
}

/// Generate a placeholder source tree for `app_name` staged with `identity`.
///
/// The directory name embeds both the buildpack and the app name so
/// concurrent clones never collide.
pub fn generate(app_name: &str, identity: &RuntimeIdentity) -> Result<PlaceholderArtifact, CloneError> {
    generate_in(std::env::temp_dir(), app_name, identity)
}

/// Like [`generate`], with the parent of the placeholder directory made
/// explicit. A failure here creates nothing under `base`.
pub fn generate_in(
    base: impl AsRef<Path>,
    app_name: &str,
    identity: &RuntimeIdentity,
) -> Result<PlaceholderArtifact, CloneError> {
    let prefix = format!("cf-{}-{}", identity.label().replace('_', "-"), app_name);
    let dir = TempDir::with_prefix_in(&prefix, base).map_err(|e| {
        CloneError::PlaceholderGeneration {
            app: app_name.to_string(),
            buildpack: identity.label().to_string(),
            source: e,
        }
    })?;

    let write = |result: std::io::Result<()>| {
        result.map_err(|e| CloneError::PlaceholderGeneration {
            app: app_name.to_string(),
            buildpack: identity.label().to_string(),
            source: e,
        })
    };

    match identity.family() {
        RuntimeFamily::Java => write(write_java(dir.path(), app_name))?,
        RuntimeFamily::NodeJs => write(write_nodejs(dir.path(), app_name))?,
        RuntimeFamily::Python => write(write_python(dir.path(), app_name))?,
        RuntimeFamily::Go => write(write_go(dir.path(), app_name))?,
        RuntimeFamily::Php => write(write_php(dir.path(), app_name))?,
        RuntimeFamily::Ruby => write(write_ruby(dir.path(), app_name))?,
        RuntimeFamily::Static => write(write_static(dir.path(), app_name))?,
    }

    info!(
        "created {} placeholder at {}",
        identity.label(),
        dir.path().display()
    );
    Ok(PlaceholderArtifact {
        dir,
        identity: identity.clone(),
    })
}

fn write_java(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let pom = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <groupId>placeholder</groupId>
    <artifactId>{app_name}</artifactId>
    <version>1.0.0</version>
    <packaging>jar</packaging>
    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>3.0.0</version>
    </parent>
    <dependencies>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-web</artifactId>
        </dependency>
    </dependencies>
</project>
"#
    );
    let source = format!(
        r#"package placeholder;

@org.springframework.boot.autoconfigure.SpringBootApplication
public class PlaceholderApplication {{
    public static void main(String[] args) {{
        org.springframework.boot.SpringApplication.run(PlaceholderApplication.class, args);
    }}

    @org.springframework.web.bind.annotation.RestController
    static class PlaceholderController {{
        @org.springframework.web.bind.annotation.GetMapping("/")
        String home() {{ return "Placeholder for {app_name}"; }}
    }}
}}
"#
    );
    let manifest = "Manifest-Version: 1.0\n\
                    Main-Class: org.springframework.boot.loader.JarLauncher\n\
                    Start-Class: PlaceholderApplication\n\
                    Spring-Boot-Version: 3.0.0\n";

    fs::create_dir_all(dir.join("src/main/java/placeholder"))?;
    fs::write(dir.join("pom.xml"), pom)?;
    fs::write(
        dir.join("src/main/java/placeholder/PlaceholderApplication.java"),
        source,
    )?;
    fs::create_dir_all(dir.join("META-INF"))?;
    fs::write(dir.join("META-INF/MANIFEST.MF"), manifest)?;
    Ok(())
}

fn write_nodejs(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let package_json = format!(
        r#"{{
  "name": "{app_name}-placeholder",
  "version": "1.0.0",
  "main": "server.js",
  "scripts": {{
    "start": "node server.js"
  }},
  "engines": {{
    "node": ">=18.0.0"
  }}
}}
"#
    );
    let server_js = format!(
        r#"const http = require('http');
const port = process.env.PORT || 8080;

const server = http.createServer((req, res) => {{
  res.writeHead(200, {{ 'Content-Type': 'text/html' }});
  res.end('<h1>Placeholder for {app_name}</h1><p>This app will be replaced with real source.</p>');
}});

server.listen(port, () => {{
  console.log('Placeholder server running on port ' + port);
}});
"#
    );

    fs::write(dir.join("package.json"), package_json)?;
    fs::write(dir.join("server.js"), server_js)?;
    Ok(())
}

fn write_python(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let requirements = "Flask==2.3.0\ngunicorn==20.1.0\n";
    let app_py = format!(
        r#"from flask import Flask
import os

app = Flask(__name__)

@app.route('/')
def hello():
    return f'<h1>Placeholder for {app_name}</h1><p>This app will be replaced with real source.</p>'

if __name__ == '__main__':
    port = int(os.environ.get('PORT', 8080))
    app.run(host='0.0.0.0', port=port)
"#
    );

    fs::write(dir.join("requirements.txt"), requirements)?;
    fs::write(dir.join("app.py"), app_py)?;
    fs::write(dir.join("Procfile"), "web: gunicorn app:app")?;
    Ok(())
}

fn write_go(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let go_mod = format!("module {app_name}-placeholder\n\ngo 1.19\n");
    let main_go = format!(
        r#"package main

import (
    "fmt"
    "net/http"
    "os"
)

func main() {{
    http.HandleFunc("/", func(w http.ResponseWriter, r *http.Request) {{
        fmt.Fprintf(w, "<h1>Placeholder for {app_name}</h1><p>This app will be replaced with real source.</p>")
    }})

    port := os.Getenv("PORT")
    if port == "" {{
        port = "8080"
    }}

    fmt.Printf("Placeholder server starting on port %s\n", port)
    http.ListenAndServe(":"+port, nil)
}}
"#
    );

    fs::write(dir.join("go.mod"), go_mod)?;
    fs::write(dir.join("main.go"), main_go)?;
    Ok(())
}

fn write_php(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let composer_json = format!(
        r#"{{
    "name": "{app_name}/placeholder",
    "require": {{
        "php": ">=8.1"
    }}
}}
"#
    );
    let index_php = format!(
        r#"<?php
echo "<h1>Placeholder for {app_name}</h1>";
echo "<p>This app will be replaced with real source.</p>";
?>
"#
    );

    fs::write(dir.join("composer.json"), composer_json)?;
    fs::write(dir.join("index.php"), index_php)?;
    Ok(())
}

fn write_ruby(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let gemfile = "source 'https://rubygems.org'\nruby '3.1.0'\n\ngem 'sinatra'\ngem 'puma'\n";
    let app_rb = format!(
        r#"require 'sinatra'

get '/' do
  "<h1>Placeholder for {app_name}</h1><p>This app will be replaced with real source.</p>"
end
"#
    );
    let config_ru = "require './app'\nrun Sinatra::Application\n";

    fs::write(dir.join("Gemfile"), gemfile)?;
    fs::write(dir.join("app.rb"), app_rb)?;
    fs::write(dir.join("config.ru"), config_ru)?;
    Ok(())
}

fn write_static(dir: &Path, app_name: &str) -> std::io::Result<()> {
    let index_html = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{app_name} - Placeholder</title></head>
<body>
    <h1>Placeholder for {app_name}</h1>
    <p>This app will be replaced with real source.</p>
</body>
</html>
"#
    );

    fs::write(dir.join("index.html"), index_html)?;
    fs::write(dir.join("Staticfile"), "root: .")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_map_to_families() {
        let cases = [
            ("java_buildpack", RuntimeFamily::Java),
            ("java_buildpack_offline", RuntimeFamily::Java),
            ("nodejs_buildpack", RuntimeFamily::NodeJs),
            ("python_buildpack", RuntimeFamily::Python),
            ("go_buildpack", RuntimeFamily::Go),
            ("php_buildpack", RuntimeFamily::Php),
            ("ruby_buildpack", RuntimeFamily::Ruby),
            ("staticfile_buildpack", RuntimeFamily::Static),
        ];
        for (label, family) in cases {
            assert_eq!(RuntimeIdentity::from_label(label).family(), family);
        }
    }

    #[test]
    fn test_unknown_label_falls_back_to_static() {
        let identity = RuntimeIdentity::from_label("binary_buildpack");
        assert_eq!(identity.family(), RuntimeFamily::Static);
        assert_eq!(identity.label(), "binary_buildpack");
    }

    #[test]
    fn test_label_equality_is_exact() {
        let online = RuntimeIdentity::from_label("java_buildpack");
        let offline = RuntimeIdentity::from_label("java_buildpack_offline");
        assert_eq!(online.family(), offline.family());
        assert_ne!(online, offline);
    }

    #[test]
    fn test_directory_prefix_embeds_buildpack_and_app() {
        let identity = RuntimeIdentity::from_label("java_buildpack");
        let artifact = generate("billing-api", &identity).unwrap();
        let dir_name = artifact
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(dir_name.starts_with("cf-java-buildpack-billing-api"));
        artifact.cleanup();
    }

    #[test]
    fn test_java_placeholder_contents() {
        let identity = RuntimeIdentity::from_label("java_buildpack");
        let artifact = generate("billing-api", &identity).unwrap();
        let pom = fs::read_to_string(artifact.path().join("pom.xml")).unwrap();
        assert!(pom.contains("<artifactId>billing-api</artifactId>"));
        assert!(artifact
            .path()
            .join("src/main/java/placeholder/PlaceholderApplication.java")
            .exists());
        assert!(artifact.path().join("META-INF/MANIFEST.MF").exists());
        artifact.cleanup();
    }

    #[test]
    fn test_nodejs_placeholder_contents() {
        let identity = RuntimeIdentity::from_label("nodejs_buildpack");
        let artifact = generate("web", &identity).unwrap();
        let pkg = fs::read_to_string(artifact.path().join("package.json")).unwrap();
        assert!(pkg.contains("\"name\": \"web-placeholder\""));
        assert!(artifact.path().join("server.js").exists());
        artifact.cleanup();
    }

    #[test]
    fn test_python_placeholder_contents() {
        let identity = RuntimeIdentity::from_label("python_buildpack");
        let artifact = generate("api", &identity).unwrap();
        assert!(artifact.path().join("requirements.txt").exists());
        assert!(artifact.path().join("app.py").exists());
        let procfile = fs::read_to_string(artifact.path().join("Procfile")).unwrap();
        assert_eq!(procfile, "web: gunicorn app:app");
        artifact.cleanup();
    }

    #[test]
    fn test_go_placeholder_contents() {
        let identity = RuntimeIdentity::from_label("go_buildpack");
        let artifact = generate("svc", &identity).unwrap();
        let go_mod = fs::read_to_string(artifact.path().join("go.mod")).unwrap();
        assert!(go_mod.starts_with("module svc-placeholder"));
        assert!(artifact.path().join("main.go").exists());
        artifact.cleanup();
    }

    #[test]
    fn test_php_placeholder_contents() {
        let identity = RuntimeIdentity::from_label("php_buildpack");
        let artifact = generate("site", &identity).unwrap();
        assert!(artifact.path().join("composer.json").exists());
        assert!(artifact.path().join("index.php").exists());
        artifact.cleanup();
    }

    #[test]
    fn test_ruby_placeholder_contents() {
        let identity = RuntimeIdentity::from_label("ruby_buildpack");
        let artifact = generate("api", &identity).unwrap();
        assert!(artifact.path().join("Gemfile").exists());
        assert!(artifact.path().join("app.rb").exists());
        assert!(artifact.path().join("config.ru").exists());
        artifact.cleanup();
    }

    #[test]
    fn test_static_fallback_contents() {
        let identity = RuntimeIdentity::from_label("something_new");
        let artifact = generate("legacy", &identity).unwrap();
        let staticfile = fs::read_to_string(artifact.path().join("Staticfile")).unwrap();
        assert_eq!(staticfile, "root: .");
        let index = fs::read_to_string(artifact.path().join("index.html")).unwrap();
        assert!(index.contains("Placeholder for legacy"));
        artifact.cleanup();
    }

    #[test]
    fn test_generation_failure_creates_nothing() {
        let base = tempfile::tempdir().unwrap();
        let blocked = base.path().join("blocked");
        fs::write(&blocked, "a plain file, not a directory").unwrap();

        let identity = RuntimeIdentity::from_label("java_buildpack");
        let err = generate_in(&blocked, "billing-api", &identity)
            .err()
            .unwrap();
        match err {
            CloneError::PlaceholderGeneration { app, buildpack, .. } => {
                assert_eq!(app, "billing-api");
                assert_eq!(buildpack, "java_buildpack");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Nothing of the placeholder may survive a failed generation.
        let leftovers: Vec<_> = fs::read_dir(base.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("cf-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_cleanup_removes_directory() {
        let identity = RuntimeIdentity::from_label("staticfile_buildpack");
        let artifact = generate("tmp-app", &identity).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        artifact.cleanup();
        assert!(!path.exists());
    }
}
