use milim_core::model::{DailyProgressRecord, List, ListId, WordEntry};
use milim_core::time::fixed_now;
use storage::repository::{ListRepository, NewListRecord, ProgressRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn build_words() -> Vec<WordEntry> {
    vec![
        WordEntry::new("cat", vec!["חתול".into()]).unwrap(),
        WordEntry::new("hello", vec!["שלום".into(), "שָׁלוֹם".into()]).unwrap(),
    ]
}

#[tokio::test]
async fn sqlite_roundtrip_persists_words_and_counts() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = NewListRecord::new("Animals", fixed_now(), &build_words());
    let id = repo.insert_new_list(record).await.unwrap();

    let mut list = repo.get_list(id).await.unwrap().expect("list exists");
    assert_eq!(list.name(), "Animals");
    assert_eq!(list.len(), 2);
    assert_eq!(
        list.word_at(1).unwrap().accepted_answers(),
        ["שלום", "שָׁלוֹם"]
    );

    // full-replace write-back after an answer
    list.word_at_mut(0).unwrap().record_incorrect();
    repo.update_list(&list).await.unwrap();

    let reloaded = repo.get_list(id).await.unwrap().unwrap();
    assert_eq!(reloaded.word_at(0).unwrap().incorrect_count(), 1);
    assert_eq!(reloaded.word_at(0).unwrap().correct_count(), 0);
}

#[tokio::test]
async fn sqlite_lists_sorted_and_deletable() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sorted?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.insert_new_list(NewListRecord::new("Verbs", fixed_now(), &build_words()))
        .await
        .unwrap();
    let animals_id = repo
        .insert_new_list(NewListRecord::new("Animals", fixed_now(), &build_words()))
        .await
        .unwrap();

    let names: Vec<String> = repo
        .all_lists()
        .await
        .unwrap()
        .iter()
        .map(|l| l.name().to_owned())
        .collect();
    assert_eq!(names, ["Animals", "Verbs"]);

    repo.delete_list(animals_id).await.unwrap();
    assert!(repo.get_list(animals_id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_list(animals_id).await.unwrap_err(),
        StorageError::NotFound
    ));
}

#[tokio::test]
async fn sqlite_update_missing_list_is_not_found() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let ghost = List::new(ListId::new(99), "Ghost", fixed_now(), build_words()).unwrap();
    assert!(matches!(
        repo.update_list(&ghost).await.unwrap_err(),
        StorageError::NotFound
    ));
}

#[tokio::test]
async fn sqlite_upsert_preserves_snapshot_ids() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let list = List::new(ListId::new(7), "Imported", fixed_now(), build_words()).unwrap();
    repo.upsert_list(&list).await.unwrap();

    let fetched = repo.get_list(ListId::new(7)).await.unwrap().unwrap();
    assert_eq!(fetched.name(), "Imported");
    assert_eq!(fetched.len(), 2);
}

#[tokio::test]
async fn sqlite_progress_day_upsert_and_clear() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let today = fixed_now().date_naive();
    let mut day = DailyProgressRecord::empty(today);
    day.record_session(3);
    repo.upsert_day(&day).await.unwrap();

    day.record_session(2);
    repo.upsert_day(&day).await.unwrap();

    let fetched = repo.get_day(today).await.unwrap().unwrap();
    assert_eq!(fetched.sessions_completed, 2);
    assert_eq!(fetched.words_mastered, 5);

    repo.clear_days().await.unwrap();
    assert!(repo.all_days().await.unwrap().is_empty());
}
