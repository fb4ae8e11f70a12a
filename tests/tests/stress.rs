use rand::seq::SliceRandom;
use rand::Rng;

use quepaxa::prototyping::DirectCommunicators;
use quepaxa::ClientRequest;
use quepaxa::ClientResponse;
use quepaxa_tests::init_tracing;
use quepaxa_tests::Cluster;

#[test]
fn stress_test() {
    init_tracing();

    let communicators =
        DirectCommunicators::with_characteristics(0.0, rand_distr::Normal::new(3.0, 2.0).unwrap());
    let mut cluster = Cluster::with_network(5, communicators);

    let node_count = cluster.size();
    let ops_per_node = 12;

    let mut requests: Vec<_> = (0..node_count)
        .flat_map(|n| {
            (0..ops_per_node).map(move |i| {
                let key = (i % 4) as i64;
                let request = match i % 3 {
                    0 => ClientRequest::Read { key },
                    1 => ClientRequest::Write {
                        key,
                        value: (n * 100 + i) as i64,
                    },
                    _ => ClientRequest::Cas {
                        key,
                        from: 0,
                        to: (n * 100 + i) as i64,
                    },
                };
                (n, request)
            })
        })
        .collect();
    requests.shuffle(&mut rand::thread_rng());

    let total = requests.len();
    let responses = cluster.submit_all(requests.clone());

    for ((_, request), response) in requests.iter().zip(&responses) {
        match (request, response) {
            (ClientRequest::Read { .. }, ClientResponse::ReadOk { .. })
            | (ClientRequest::Write { .. }, ClientResponse::WriteOk)
            | (ClientRequest::Cas { .. }, ClientResponse::CasOk) => {}
            _ => panic!("{:?} was answered with {:?}", request, response),
        }
    }

    cluster.await_decisions(&cluster.all(), total);
    cluster.assert_agreement(&cluster.all());

    let log = cluster.log(0);
    assert_eq!(log.len(), total);

    let mut ids: Vec<_> = log.iter().map(|e| e.operation.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);

    let sampled = rand::thread_rng().gen_range(0..node_count);
    for key in 0..4 {
        assert_eq!(
            cluster.read_stale(sampled, key),
            cluster.read_stale(0, key),
        );
    }
}
