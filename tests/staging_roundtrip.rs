//! End-to-end staging: request payload, submitted task, completion, response.

use stager::core::action::Action;
use stager::core::config::parse_config;
use stager::core::stager::Stager;
use stager::core::types::{StagingResponse, TaskCallbackResponse, TaskDefinition};
use stager::transport::memory::{FixedLocator, RecordingPublisher, RecordingSubmitter};
use std::sync::Arc;

const CONFIG_YAML: &str = r#"
callback_url: http://the-stager.example.com
min_memory_mb: 1024
min_disk_mb: 2048
min_file_descriptors: 256
compilers:
  rabbit_hole: rabbit-hole-compiler
"#;

fn request(task_id: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "app_id": "bunny",
        "task_id": task_id,
        "app_bits_download_uri": "http://x/bunny",
        "stack": "rabbit_hole",
        "buildpacks": [
            {"name": "zfirst", "key": "zfirst-buildpack", "url": "u1"},
            {"name": "asecond", "key": "asecond-buildpack", "url": "u2"}
        ],
        "build_artifacts_cache_upload_uri": "http://example-uri.com/bunny-uppings",
        "droplet_upload_uri": "http://example-uri.com/droplet-upload",
        "environment": [{"name": "VCAP_APPLICATION", "value": "foo"}],
        "memory_mb": 2048,
        "disk_mb": 3072,
        "file_descriptors": 512
    }))
    .unwrap()
}

struct Setup {
    stager: Stager,
    submitter: Arc<RecordingSubmitter>,
    publisher: Arc<RecordingPublisher>,
}

fn setup() -> Setup {
    let config = parse_config(CONFIG_YAML).unwrap();
    let submitter = Arc::new(RecordingSubmitter::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let stager = Stager::new(
        config,
        Arc::new(FixedLocator::available("http://file-server.com/")),
        submitter.clone(),
        publisher.clone(),
    );
    Setup {
        stager,
        submitter,
        publisher,
    }
}

fn phase_children(action: &Action) -> Vec<Action> {
    match action.unwrap_progress() {
        Action::Parallel { actions } => actions.clone(),
        other => panic!("expected parallel phase, got {:?}", other),
    }
}

fn only_task(submitter: &RecordingSubmitter) -> TaskDefinition {
    let tasks = submitter.tasks();
    assert_eq!(tasks.len(), 1);
    tasks.into_iter().next().unwrap()
}

#[tokio::test]
async fn test_stage_builds_expected_recipe() {
    let s = setup();
    s.stager.stage(&request("hop")).await.unwrap();
    let task = only_task(&s.submitter);

    assert_eq!(task.task_guid, "bunny-hop");
    assert_eq!(task.memory_mb, 2048);
    assert_eq!(task.disk_mb, 3072);
    assert_eq!(task.actions.len(), 3);

    let fetch = phase_children(&task.actions[0]);
    let sources: Vec<String> = fetch
        .iter()
        .filter_map(|a| match a.unwrap_progress() {
            Action::Download { from, .. } => Some(from.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        sources,
        vec![
            "http://file-server.com/v1/static/rabbit-hole-compiler",
            "http://x/bunny",
            "u1",
            "u2"
        ]
    );
    // No prior cache supplied
    assert!(!fetch.iter().any(|a| matches!(a, Action::BestEffort { .. })));

    match task.actions[1].unwrap_progress() {
        Action::Run {
            args,
            resource_limits,
            ..
        } => {
            assert!(args.contains(&"-buildpackOrder=zfirst-buildpack,asecond-buildpack".to_string()));
            assert_eq!(resource_limits.nofile, Some(512));
        }
        other => panic!("expected run action, got {:?}", other),
    }

    let uploads = phase_children(&task.actions[2]);
    match uploads[0].unwrap_progress() {
        Action::Upload { to, .. } => assert_eq!(
            to,
            "http://file-server.com/v1/droplet/bunny?cc-droplet-upload-uri=http%3A%2F%2Fexample-uri.com%2Fdroplet-upload"
        ),
        other => panic!("expected droplet upload, got {:?}", other),
    }
    assert!(matches!(uploads[1], Action::BestEffort { .. }));
}

#[tokio::test]
async fn test_completion_roundtrips_identity() {
    let s = setup();
    s.stager.stage(&request("hop")).await.unwrap();
    let task = only_task(&s.submitter);

    let callback = TaskCallbackResponse {
        task_guid: task.task_guid.clone(),
        failed: false,
        failure_reason: String::new(),
        result: r#"{"buildpack_key":"zfirst-buildpack","detected_buildpack":"zfirst","execution_metadata":"{}","detected_start_command":"./run"}"#.to_string(),
        annotation: task.annotation.clone(),
    };
    s.stager
        .complete_json(&serde_json::to_vec(&callback).unwrap())
        .await
        .unwrap();

    let published = s.publisher.published();
    assert_eq!(published.len(), 1);
    let response: StagingResponse = serde_json::from_slice(&published[0]).unwrap();
    assert_eq!(response.app_id, "bunny");
    assert_eq!(response.task_id, "hop");
    assert_eq!(response.buildpack_key.as_deref(), Some("zfirst-buildpack"));
    assert_eq!(response.detected_start_command.as_deref(), Some("./run"));
    assert_eq!(response.error, None);
}

#[tokio::test]
async fn test_concurrent_stagings_are_independent() {
    let s = setup();
    let (hop, skip, jump) = (request("hop"), request("skip"), request("jump"));
    let (a, b, c) = tokio::join!(
        s.stager.stage(&hop),
        s.stager.stage(&skip),
        s.stager.stage(&jump),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let mut guids: Vec<String> = s
        .submitter
        .tasks()
        .into_iter()
        .map(|t| t.task_guid)
        .collect();
    guids.sort();
    assert_eq!(guids, vec!["bunny-hop", "bunny-jump", "bunny-skip"]);
}
