use jsonschema::validator_for;
use test_support::{cmd_bin, fixtures_dir, read_fixture_json, FixtureBackend};

fn read_schema(name: &str) -> serde_json::Value {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir.join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  serde_json::from_slice(&data).expect("valid schema JSON")
}

fn compile_schema(name: &str) -> jsonschema::Validator {
  let schema = read_schema(name);
  validator_for(&schema).expect("compile schema")
}

#[test]
fn decoded_parameters_conform_to_schema() {
  let file = fixtures_dir().join("params").join("stock_status.txt");
  let out = cmd_bin()
    .args(["params", "decode", "--file", file.to_str().unwrap()])
    .output()
    .unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let compiled = compile_schema("parameter-map.schema.json");
  compiled.validate(&v).expect("schema validation failed for decoded parameters");
}

#[test]
fn job_list_conforms_to_schema() {
  let page: serde_json::Value = read_fixture_json("api/batch_jobs.json");
  let backend = FixtureBackend::new(serde_json::json!({ "GET stockmanagement/batchjob": page }));

  let out = backend.cmd().args(["jobs", "list"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let compiled = compile_schema("batch-job-list.schema.json");
  compiled.validate(&v).expect("schema validation failed for job list");
}

#[test]
fn unknown_statuses_still_list() {
  let backend = FixtureBackend::new(serde_json::json!({
    "GET stockmanagement/batchjob": { "results": [{ "uuid": "j", "status": "Archived" }] }
  }));

  let out = backend.cmd().args(["jobs", "list"]).output().unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v[0]["status"], "Unknown");
  compile_schema("batch-job-list.schema.json").validate(&v).expect("schema validation failed");
}
