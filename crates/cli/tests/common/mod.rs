#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

pub const POLICIES: &str = r#"{
  "policyAreas": {
    "Enabling Infrastructure": {
      "phases": {
        "Analysis": {
          "policies": [
            { "id": "P3", "title": "Connectivity audit", "description": "Map broadband gaps", "keywords": ["connectivity"] }
          ]
        },
        "Design": {
          "policies": [
            { "id": "P1", "title": "National data exchange", "description": "Shared exchange layer for agencies", "examples": "X-Road", "keywords": ["data", "privacy", "interoperability"] }
          ]
        },
        "Implementation": {
          "policies": [
            { "id": "P6", "title": "Open portal", "description": "Publish datasets", "keywords": ["data", "open"] }
          ]
        }
      }
    },
    "Legislation & Policy": {
      "phases": {
        "Design": {
          "policies": [
            { "id": "P2", "title": "Protection act", "description": "Statutory rights for individuals", "keywords": ["privacy", "rights"] }
          ]
        }
      }
    },
    "Sustainability & Society": {
      "phases": {
        "Design": {
          "policies": [
            { "id": "P5", "title": "Inclusive access", "description": "Affordable devices", "keywords": ["inclusion", "privacy", "data"] }
          ]
        }
      }
    },
    "Research & Education": {
      "phases": {
        "Implementation": {
          "policies": [
            { "id": "P4", "title": "Skills programme", "description": "Training for civil servants", "keywords": ["skills", "training"] }
          ]
        }
      }
    }
  }
}"#;

pub const EXPERTS: &str = r#"{
  "experts": [
    { "name": "Ada Lovelace", "title": "Privacy counsel", "keywords": ["privacy", "rights"] },
    { "name": "Bo Chen", "title": "Skills lead", "keywords": ["skills"] },
    { "name": "Cy Okafor", "title": "Data architect", "keywords": ["data"] }
  ]
}"#;

pub const CONSIDERATIONS: &str = r#"{
  "specialConsiderations": {
    "universal": {
      "ethics": { "title": "Ethics", "items": [ { "name": "Consent", "description": "Ask first" } ] }
    },
    "dimensionPhaseMapping": {
      "Enabling Infrastructure": { "Design": { "universal": ["ethics"] } }
    }
  }
}"#;

/// Temp dir holding all three default data files.
pub fn setup_data() -> TempDir {
    let temp = tempdir().unwrap();
    write_data(temp.path());
    temp
}

pub fn write_data(dir: &Path) {
    fs::write(dir.join("policy-data.json"), POLICIES).unwrap();
    fs::write(dir.join("expert-data.json"), EXPERTS).unwrap();
    fs::write(dir.join("special-considerations.json"), CONSIDERATIONS).unwrap();
}

#[allow(deprecated)]
pub fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("policy-tool").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("POLICY_TOOL_DATA_DIR")
        .env_remove("POLICY_TOOL_CONFIG");
    cmd
}

pub fn run_command_raw(workdir: &Path, request: &str) -> (bool, Value) {
    let output = cli(workdir)
        .arg("command")
        .arg("--json")
        .arg(request)
        .output()
        .expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}

pub fn run_command(workdir: &Path, request: &str) -> Value {
    let (ok, body) = run_command_raw(workdir, request);
    assert!(ok, "stdout: {body}\nrequest: {request}");
    body
}
