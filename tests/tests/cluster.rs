use quepaxa::ClientRequest;
use quepaxa::ClientResponse;
use quepaxa::Event;
use quepaxa_tests::init_tracing;
use quepaxa_tests::Cluster;
use quepaxa_tests::LEADER;

fn fast_path_flags(cluster: &Cluster, slot: u64) -> Vec<bool> {
    cluster
        .events()
        .into_iter()
        .filter_map(|(_, e)| match e {
            Event::Decided {
                slot: s, fast_path, ..
            } if s == slot => Some(fast_path),
            _ => None,
        })
        .collect()
}

#[test]
fn write_then_read_across_nodes() {
    init_tracing();

    let mut cluster = Cluster::new(3);

    assert_eq!(
        cluster.submit(0, ClientRequest::Write { key: 5, value: 42 }),
        ClientResponse::WriteOk
    );
    assert_eq!(
        cluster.submit(2, ClientRequest::Read { key: 5 }),
        ClientResponse::ReadOk { value: 42 }
    );

    cluster.await_decisions(&cluster.all(), 2);
    cluster.assert_agreement(&cluster.all());
    assert_eq!(cluster.read_stale(1, 5), Some(42));
}

#[test]
fn compare_and_set_acknowledges_mismatches() {
    let mut cluster = Cluster::new(3);

    cluster.submit(0, ClientRequest::Write { key: 5, value: 10 });

    let hit = cluster.submit(
        1,
        ClientRequest::Cas {
            key: 5,
            from: 10,
            to: 20,
        },
    );
    assert_eq!(hit, ClientResponse::CasOk);
    assert_eq!(
        cluster.submit(2, ClientRequest::Read { key: 5 }),
        ClientResponse::ReadOk { value: 20 }
    );

    let miss = cluster.submit(
        2,
        ClientRequest::Cas {
            key: 5,
            from: 99,
            to: 30,
        },
    );
    assert_eq!(miss, ClientResponse::CasOk);
    assert_eq!(
        cluster.submit(0, ClientRequest::Read { key: 5 }),
        ClientResponse::ReadOk { value: 20 }
    );

    cluster.await_decisions(&cluster.all(), 5);
    cluster.assert_agreement(&cluster.all());
}

#[test]
fn leader_submission_is_decided_on_the_fast_path() {
    let mut cluster = Cluster::new(3);

    cluster.submit(LEADER, ClientRequest::Write { key: 1, value: 1 });
    cluster.await_decisions(&cluster.all(), 1);

    assert_eq!(fast_path_flags(&cluster, 0), vec![true; 3]);
}

#[test]
fn concurrent_writes_are_ordered_identically() {
    let mut cluster = Cluster::new(3);

    let responses = cluster.submit_all(vec![
        (0, ClientRequest::Write { key: 7, value: 1 }),
        (2, ClientRequest::Write { key: 7, value: 2 }),
    ]);
    assert_eq!(responses, vec![ClientResponse::WriteOk; 2]);

    cluster.await_decisions(&cluster.all(), 2);
    cluster.assert_agreement(&cluster.all());

    let log = cluster.log(0);
    assert_ne!(log[0].operation.id, log[1].operation.id);
    assert_eq!(cluster.read_stale(0, 7), Some(log[1].operation.value));
}

#[test]
fn every_node_serves_clients() {
    let mut cluster = Cluster::new(5);

    let requests = (0..25)
        .map(|i| (i % 5, ClientRequest::Write { key: i as i64, value: 100 + i as i64 }))
        .collect();
    let responses = cluster.submit_all(requests);
    assert_eq!(responses.len(), 25);

    cluster.await_decisions(&cluster.all(), 25);
    cluster.assert_agreement(&cluster.all());

    for key in 0..25 {
        assert_eq!(cluster.read_stale(3, key), Some(100 + key));
    }

    let answered = cluster
        .events()
        .into_iter()
        .filter(|(_, e)| matches!(e, Event::Answered { .. }))
        .count();
    assert_eq!(answered, 25);
}
