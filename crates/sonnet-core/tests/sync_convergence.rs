//! End-to-end convergence tests: lifecycle operations on two devices
//! reconciling through a shared remote mirror.

use sonnet_core::remote::MemoryRemote;
use sonnet_core::{BlogActions, BlogPatch, BlogStore, SyncManager};

const AUTHOR: &str = "author-1";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

struct Device {
    actions: BlogActions,
    manager: SyncManager<MemoryRemote>,
}

impl Device {
    fn new(remote: &MemoryRemote) -> Self {
        init_tracing();
        let store = BlogStore::open_in_memory().unwrap();
        Self {
            actions: BlogActions::new(store.clone()),
            manager: SyncManager::new(store, remote.clone(), AUTHOR),
        }
    }

    fn store(&self) -> &BlogStore {
        self.actions.store()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_on_one_device_appears_on_the_other() {
    let remote = MemoryRemote::new();
    let laptop = Device::new(&remote);
    let phone = Device::new(&remote);

    let id = laptop.actions.create("Draft", AUTHOR, None).await.unwrap();
    laptop.manager.sync().await.unwrap();
    phone.manager.sync().await.unwrap();

    let copy = phone.store().get(&id).await.unwrap().unwrap();
    assert_eq!(copy.title, "Draft");
    assert!(!phone.manager.needs_sync().await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn newest_edit_wins_across_devices() {
    let remote = MemoryRemote::new();
    let laptop = Device::new(&remote);
    let phone = Device::new(&remote);

    let id = laptop.actions.create("v1", AUTHOR, None).await.unwrap();
    laptop.manager.sync().await.unwrap();
    phone.manager.sync().await.unwrap();

    // the phone edits later than the laptop
    laptop
        .actions
        .update(id, BlogPatch::default().title("laptop edit"))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    phone
        .actions
        .update(id, BlogPatch::default().title("phone edit"))
        .await
        .unwrap();

    laptop.manager.sync().await.unwrap();
    phone.manager.sync().await.unwrap();
    laptop.manager.sync().await.unwrap();

    let on_laptop = laptop.store().get(&id).await.unwrap().unwrap();
    let on_phone = phone.store().get(&id).await.unwrap().unwrap();
    assert_eq!(on_laptop.title, "phone edit");
    assert_eq!(on_laptop.updated_at, on_phone.updated_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn soft_delete_converges_to_purge_on_both_replicas() {
    let remote = MemoryRemote::new();
    let laptop = Device::new(&remote);
    let phone = Device::new(&remote);

    let id = laptop.actions.create("doomed", AUTHOR, None).await.unwrap();
    laptop.manager.sync().await.unwrap();
    phone.manager.sync().await.unwrap();

    laptop.actions.delete(id).await.unwrap();
    laptop.manager.sync().await.unwrap();

    // gone from the deleting device and the shared mirror
    assert!(laptop.store().get(&id).await.unwrap().is_none());
    assert!(remote.row(&id).is_none());

    // the other device still holds a live copy; its next pass pushes the
    // record back up since the tombstone is no longer visible anywhere
    phone.manager.sync().await.unwrap();
    assert!(remote.row(&id).is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn archived_subtree_round_trips_through_sync() {
    let remote = MemoryRemote::new();
    let laptop = Device::new(&remote);
    let phone = Device::new(&remote);

    let root = laptop.actions.create("root", AUTHOR, None).await.unwrap();
    let child = laptop
        .actions
        .create("child", AUTHOR, Some(root))
        .await
        .unwrap();
    laptop.actions.archive(root).await.unwrap();
    laptop.manager.sync().await.unwrap();
    phone.manager.sync().await.unwrap();

    for id in [root, child] {
        let copy = phone.store().get(&id).await.unwrap().unwrap();
        assert!(copy.is_archived);
    }

    // restore the child alone on the phone: it detaches from the archived root
    phone.actions.restore(child).await.unwrap();
    phone.manager.sync().await.unwrap();
    laptop.manager.sync().await.unwrap();

    let on_laptop = laptop.store().get(&child).await.unwrap().unwrap();
    assert!(!on_laptop.is_archived);
    assert_eq!(on_laptop.parent_id, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn outage_keeps_local_writes_and_divergence_flag() {
    let remote = MemoryRemote::new();
    let laptop = Device::new(&remote);

    let id = laptop
        .actions
        .create("offline draft", AUTHOR, None)
        .await
        .unwrap();

    remote.set_fail_reads(true);
    assert!(laptop.manager.sync().await.is_err());

    assert!(laptop.store().get(&id).await.unwrap().is_some());

    remote.set_fail_reads(false);
    assert!(laptop.manager.needs_sync().await.unwrap());
    laptop.manager.sync().await.unwrap();
    assert!(!laptop.manager.needs_sync().await.unwrap());
}
