use std::time::Duration;

use futures::executor::block_on;

use quepaxa::ClientRequest;
use quepaxa::ClientResponse;
use quepaxa_tests::Cluster;

const ISOLATED: usize = 2;

fn isolate(cluster: &mut Cluster, node: usize) {
    let isolated = cluster.id(node);
    let others: Vec<_> = (0..cluster.size())
        .filter(|&n| n != node)
        .map(|n| cluster.id(n))
        .collect();

    let communicators = cluster.communicators();
    for other in others {
        block_on(communicators.set_packet_loss(isolated, other, 1.0));
        block_on(communicators.set_packet_loss(other, isolated, 1.0));
    }
}

#[test]
fn majority_makes_progress_without_one_node() {
    let mut cluster = Cluster::new(3);
    isolate(&mut cluster, ISOLATED);

    assert_eq!(
        cluster.submit(0, ClientRequest::Write { key: 1, value: 5 }),
        ClientResponse::WriteOk
    );
    assert_eq!(
        cluster.submit(1, ClientRequest::Read { key: 1 }),
        ClientResponse::ReadOk { value: 5 }
    );

    cluster.await_decisions(&[0, 1], 2);
    cluster.assert_agreement(&[0, 1]);
    assert!(cluster.log(ISOLATED).is_empty());
}

#[test]
fn isolated_node_cannot_decide() {
    let mut cluster = Cluster::new(3);
    isolate(&mut cluster, ISOLATED);

    let response = cluster.try_submit(
        ISOLATED,
        ClientRequest::Write { key: 1, value: 5 },
        Duration::from_millis(200),
    );

    assert_eq!(response, None);
    assert!(cluster.log(ISOLATED).is_empty());
    assert_eq!(cluster.read_stale(0, 1), None);
}
