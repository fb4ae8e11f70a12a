use quepaxa::ClientRequest;
use quepaxa::ClientResponse;
use quepaxa::Event;
use quepaxa_tests::Cluster;

#[test]
fn single_write() {
    let mut cluster = Cluster::new(1);

    let response = cluster.submit(0, ClientRequest::Write { key: 1, value: 42 });

    assert_eq!(response, ClientResponse::WriteOk);
    assert_eq!(cluster.read_stale(0, 1), Some(42));
}

#[test]
fn read_of_absent_key_yields_zero() {
    let mut cluster = Cluster::new(1);

    let response = cluster.submit(0, ClientRequest::Read { key: 9 });

    assert_eq!(response, ClientResponse::ReadOk { value: 0 });
    assert_eq!(cluster.read_stale(0, 9), None);
}

#[test]
fn serial_operations() {
    let mut cluster = Cluster::new(1);

    cluster.submit(0, ClientRequest::Write { key: 1, value: 10 });
    cluster.submit(
        0,
        ClientRequest::Cas {
            key: 1,
            from: 10,
            to: 20,
        },
    );
    let response = cluster.submit(0, ClientRequest::Read { key: 1 });

    assert_eq!(response, ClientResponse::ReadOk { value: 20 });

    let log = cluster.log(0);
    assert_eq!(log.len(), 3);
    assert!(log.iter().enumerate().all(|(i, e)| e.slot == i as u64));
}

#[test]
fn concurrent_operations_are_all_decided() {
    let mut cluster = Cluster::new(1);

    let responses = cluster.submit_all(
        (0..20)
            .map(|i| (0, ClientRequest::Write { key: i, value: i }))
            .collect(),
    );

    assert!(responses.iter().all(|r| *r == ClientResponse::WriteOk));
    assert_eq!(cluster.log(0).len(), 20);
    for key in 0..20 {
        assert_eq!(cluster.read_stale(0, key), Some(key));
    }
}

#[test]
fn lone_node_always_takes_the_fast_path() {
    let mut cluster = Cluster::new(1);

    cluster.submit(0, ClientRequest::Write { key: 1, value: 1 });
    cluster.submit(0, ClientRequest::Write { key: 1, value: 2 });

    let decisions: Vec<_> = cluster
        .events()
        .into_iter()
        .filter_map(|(_, e)| match e {
            Event::Decided { fast_path, .. } => Some(fast_path),
            _ => None,
        })
        .collect();

    assert_eq!(decisions, vec![true, true]);
}
