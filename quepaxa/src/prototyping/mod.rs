//! An in-process network for tests and experiments.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::FutureExt;
use futures::future::LocalBoxFuture;
use futures::lock::Mutex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::communicator::Communicator;
use crate::error::HandleError;
use crate::message::Message;
use crate::Identifier;
use crate::RequestHandler;

/// A node id for prototyping.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize,
)]
pub struct PrototypingNode(usize);

impl PrototypingNode {
    pub fn with_id(id: usize) -> Self {
        Self(id)
    }

    pub fn id(self) -> usize {
        self.0
    }
}

type RequestHandlers<N> = HashMap<N, RequestHandler<N>>;
type PacketLossRates<N> = HashMap<(N, N), f32>;
type E2eDelays<N> = HashMap<(N, N), rand_distr::Normal<f32>>;

/// The network connecting a set of [`DirectCommunicator`]s.
///
/// Messages are encoded and decoded on their way, just as they would be by a
/// real transport.
#[derive(Debug)]
pub struct DirectCommunicators<N: Identifier> {
    request_handlers: Arc<Mutex<RequestHandlers<N>>>,
    default_packet_loss: f32,
    default_e2e_delay: rand_distr::Normal<f32>,
    packet_loss: Arc<Mutex<PacketLossRates<N>>>,
    e2e_delay: Arc<Mutex<E2eDelays<N>>>,
}

impl<N: Identifier> DirectCommunicators<N> {
    pub fn new() -> Self {
        Self::with_characteristics(0.0, no_delay())
    }

    pub fn with_characteristics(packet_loss: f32, e2e_delay: rand_distr::Normal<f32>) -> Self {
        Self {
            request_handlers: Arc::new(Mutex::new(HashMap::new())),
            default_packet_loss: packet_loss,
            default_e2e_delay: e2e_delay,
            packet_loss: Arc::new(Mutex::new(HashMap::new())),
            e2e_delay: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn set_packet_loss(&mut self, from: N, to: N, packet_loss: f32) {
        let mut link = self.packet_loss.lock().await;
        link.insert((from, to), packet_loss);
    }

    pub async fn set_delay(&mut self, from: N, to: N, delay: rand_distr::Normal<f32>) {
        let mut link = self.e2e_delay.lock().await;
        link.insert((from, to), delay);
    }

    pub fn register(&self, node_id: N, handler: RequestHandler<N>) {
        futures::executor::block_on(async {
            let mut handlers = self.request_handlers.lock().await;
            handlers.insert(node_id, handler);
        });
    }

    pub fn create_communicator_for(&self, node_id: N) -> DirectCommunicator<N> {
        DirectCommunicator {
            set: self.clone(),
            node_id,
        }
    }
}

impl<N: Identifier> Clone for DirectCommunicators<N> {
    fn clone(&self) -> Self {
        Self {
            request_handlers: Arc::clone(&self.request_handlers),
            default_packet_loss: self.default_packet_loss,
            default_e2e_delay: self.default_e2e_delay,
            packet_loss: Arc::clone(&self.packet_loss),
            e2e_delay: Arc::clone(&self.e2e_delay),
        }
    }
}

impl<N: Identifier> Default for DirectCommunicators<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum DirectCommunicatorError {
    #[error("receiver is unknown or shut down")]
    Other,

    #[error("timeout")]
    Timeout,

    #[error("message could not be encoded")]
    Codec(#[from] crate::error::CodecError),

    #[error("receiver rejected message")]
    Rejected(#[from] HandleError),
}

#[derive(Debug)]
pub struct DirectCommunicator<N: Identifier> {
    set: DirectCommunicators<N>,
    node_id: N,
}

impl<N: Identifier> Clone for DirectCommunicator<N> {
    fn clone(&self) -> Self {
        Self {
            set: self.set.clone(),
            node_id: self.node_id,
        }
    }
}

impl<N: Identifier> Communicator for DirectCommunicator<N> {
    type Node = N;

    type Error = DirectCommunicatorError;

    type SendMessage = LocalBoxFuture<'static, Result<(), Self::Error>>;

    fn send(&mut self, receiver: N, message: Message<N>) -> Self::SendMessage {
        let this = self.clone();

        async move {
            let packet_loss_rate = {
                let per_link = this.set.packet_loss.lock().await;

                per_link
                    .get(&(this.node_id, receiver))
                    .copied()
                    .unwrap_or(this.set.default_packet_loss)
            };
            let e2e_delay_distr = {
                let per_link = this.set.e2e_delay.lock().await;

                per_link
                    .get(&(this.node_id, receiver))
                    .copied()
                    .unwrap_or(this.set.default_e2e_delay)
            };

            let e2e_delay = delay(&e2e_delay_distr);
            let dropped = roll_for_failure(packet_loss_rate);

            if !e2e_delay.is_zero() {
                futures_timer::Delay::new(e2e_delay).await;
            }

            if dropped {
                return Err(DirectCommunicatorError::Timeout);
            }

            let bytes = message.encode()?;

            let handlers = this.set.request_handlers.lock().await;
            let handler = match handlers.get(&receiver) {
                Some(handler) => handler,
                None => return Err(DirectCommunicatorError::Other),
            };

            Ok(handler.handle_encoded(this.node_id, &bytes)?)
        }
        .boxed_local()
    }
}

fn no_delay() -> rand_distr::Normal<f32> {
    match rand_distr::Normal::new(0.0, 0.0) {
        Ok(distr) => distr,
        Err(_) => unreachable!("a standard deviation of zero is valid"),
    }
}

fn roll_for_failure(rate: f32) -> bool {
    use rand::Rng;

    rand::thread_rng().gen::<f32>() < rate
}

fn delay(distr: &rand_distr::Normal<f32>) -> std::time::Duration {
    use rand::distributions::Distribution;

    let delay_ms = distr.sample(&mut rand::thread_rng()).max(0.0);
    let delay_ms = delay_ms as u64;

    std::time::Duration::from_millis(delay_ms)
}
