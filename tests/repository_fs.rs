//! End-to-end repository behavior against a real filesystem store.

use harmony::error::Error;
use harmony::model::{Answer, Difficulty, HarmonyTask, Score, ScoreType};
use harmony::repository::{HarmonyTaskRepository, JsonTaskRepository, TaskFilter};
use harmony::store::FsBlobStore;
use tempfile::TempDir;

const STORAGE_KEY: &str = "harmony-tasks.json";

fn sample_task(id: &str) -> HarmonyTask {
    HarmonyTask {
        id: id.to_string(),
        description: "Complete the bass line under the given melody".to_string(),
        score: Score {
            score_type: ScoreType::Json,
            data: "{}".to_string(),
        },
        answer: vec![Answer {
            answer_type: ScoreType::Json,
            data: "{}".to_string(),
        }],
        title: None,
        difficulty: Some(Difficulty::Easy),
        tags: Some(vec!["bass".to_string()]),
    }
}

#[test]
fn save_list_delete_scenario() {
    let temp = TempDir::new().unwrap();
    let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();

    assert!(repo.list_tasks(&TaskFilter::default()).unwrap().is_empty());

    repo.save_task(&sample_task("t1")).unwrap();
    assert_eq!(repo.list_tasks(&TaskFilter::default()).unwrap().len(), 1);

    repo.delete_task("t1").unwrap();
    assert!(repo.list_tasks(&TaskFilter::default()).unwrap().is_empty());
    assert!(matches!(repo.load_task("t1"), Err(Error::TaskNotFound(_))));
}

#[test]
fn envelope_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let task = sample_task("t1");

    {
        let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();
        repo.save_task(&task).unwrap();
    }

    let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();
    assert_eq!(repo.load_task("t1").unwrap(), task);
}

#[test]
fn stored_blob_matches_the_wire_format() {
    let temp = TempDir::new().unwrap();
    let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();
    repo.save_task(&sample_task("t1")).unwrap();

    let raw = std::fs::read_to_string(temp.path().join(STORAGE_KEY)).unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(blob["tasks"][0]["id"], "t1");
    assert_eq!(blob["tasks"][0]["score"]["type"], "json");
    assert_eq!(blob["tasks"][0]["difficulty"], "easy");
    assert_eq!(blob["metadata"]["version"], "1.0");
    assert_eq!(blob["metadata"]["totalTasks"], 1);
    assert!(blob["metadata"]["lastUpdated"].is_string());

    // Omitted optional fields stay off the wire.
    assert!(blob["tasks"][0].get("title").is_none());
}

#[test]
fn filters_work_across_reopen() {
    let temp = TempDir::new().unwrap();
    let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();

    repo.save_task(&sample_task("t1")).unwrap();
    let mut hard = sample_task("t2");
    hard.difficulty = Some(Difficulty::Hard);
    hard.tags = Some(vec!["bass".to_string(), "chromatic".to_string()]);
    repo.save_task(&hard).unwrap();

    let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();

    let filter = TaskFilter {
        difficulty: Some(Difficulty::Hard),
        ..Default::default()
    };
    let tasks = repo.list_tasks(&filter).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "t2");

    let filter = TaskFilter {
        tags: Some(vec!["bass".to_string()]),
        ..Default::default()
    };
    assert_eq!(repo.list_tasks(&filter).unwrap().len(), 2);

    let filter = TaskFilter {
        tags: Some(vec!["chromatic".to_string()]),
        ..Default::default()
    };
    assert_eq!(repo.list_tasks(&filter).unwrap().len(), 1);
}

#[test]
fn hand_corrupted_file_bootstraps_on_open() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(STORAGE_KEY), "{ truncated").unwrap();

    let repo = JsonTaskRepository::new(FsBlobStore::new(temp.path()), STORAGE_KEY).unwrap();
    assert!(repo.list_tasks(&TaskFilter::default()).unwrap().is_empty());
}
