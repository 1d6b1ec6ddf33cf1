use coin_scanner::booking::{
    AppointmentStatus, AppointmentStore, NewAppointment, SqliteAppointmentStore,
};

#[tokio::test]
async fn appointments_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookings.sqlite");
    let path = path.to_str().unwrap();

    {
        let store = SqliteAppointmentStore::open(path).await.unwrap();
        let first = NewAppointment::parse("Ayşe", "05551112233", "2024-06-02", "14:30", "Saç kesimi")
            .unwrap();
        let second =
            NewAppointment::parse("Mehmet", "05324445566", "2024-06-01", "09:00", "Sakal").unwrap();
        let a = store.create(first).await.unwrap();
        let b = store.create(second).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.status, AppointmentStatus::Pending);
        assert!(store.update_status(a.id, AppointmentStatus::Confirmed).await.unwrap());
    }

    let store = SqliteAppointmentStore::open(path).await.unwrap();
    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    // Earlier date first
    assert_eq!(listed[0].name, "Mehmet");
    assert_eq!(listed[0].status, AppointmentStatus::Pending);
    assert_eq!(listed[1].name, "Ayşe");
    assert_eq!(listed[1].status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_store() {
    assert!(NewAppointment::parse("", "0555", "2024-06-01", "09:00", "Sakal").is_err());
    assert!(NewAppointment::parse("Ali", "0555", "01/06/2024", "09:00", "Sakal").is_err());
    assert!(NewAppointment::parse("Ali", "0555", "2024-06-01", "9am", "Sakal").is_err());
}
