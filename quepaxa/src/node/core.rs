//! The I/O-free heart of a node.
//!
//! [`NodeCore`] combines a node's three roles with its operation log. It is
//! fed one inbound message at a time and answers with the [`Action`]s the
//! caller must carry out. [`NodeKernel`][super::NodeKernel] does so
//! asynchronously; the unit tests below drive a whole cluster through a
//! single FIFO queue.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::config::ClusterConfig;
use crate::event::Event;
use crate::log::OperationLog;
use crate::message::Message;
use crate::operation::ClientRequest;
use crate::operation::ClientResponse;
use crate::operation::Key;
use crate::operation::Value;
use crate::proposal::FIRST_STEP;
use crate::proposer::Proposer;
use crate::proposer::ProposerAction;
use crate::proposer::ProposerActions;
use crate::recorder::Recorder;
use crate::store::KvStore;
use crate::submitter::Submitter;
use crate::Identifier;

/// Something a [`NodeCore`] asks its driver to do.
#[derive(Debug)]
pub enum Action<N, T> {
    /// Deliver `message` to `receiver`, which may be this very node.
    Send { receiver: N, message: Message<N> },
    /// Answer a client.
    Reply { client: T, response: ClientResponse },
    Emit(Event<N>),
}

pub type Actions<N, T> = Vec<Action<N, T>>;

#[derive(Debug)]
pub struct NodeCore<N, S, T> {
    config: ClusterConfig<N>,
    recorder: Recorder<N>,
    proposer: Proposer<N>,
    submitter: Submitter<N, T>,
    log: OperationLog<N, S>,
}

impl<N, S, T> NodeCore<N, S, T>
where
    N: Identifier,
    S: KvStore,
{
    pub fn new(config: ClusterConfig<N>, store: S, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let id = config.node_id();
        let proposer = Proposer::new(
            id,
            config.is_leader(),
            config.cluster_size(),
            StdRng::seed_from_u64(rng.gen()),
        );
        let submitter = Submitter::new(id, StdRng::seed_from_u64(rng.gen()));

        Self {
            config,
            recorder: Recorder::new(),
            proposer,
            submitter,
            log: OperationLog::new(store),
        }
    }

    pub fn id(&self) -> N {
        self.config.node_id()
    }

    pub fn config(&self) -> &ClusterConfig<N> {
        &self.config
    }

    pub fn recorder(&self) -> &Recorder<N> {
        &self.recorder
    }

    pub fn proposer(&self) -> &Proposer<N> {
        &self.proposer
    }

    pub fn submitter(&self) -> &Submitter<N, T> {
        &self.submitter
    }

    pub fn log(&self) -> &OperationLog<N, S> {
        &self.log
    }

    pub fn store(&self) -> &S {
        self.log.store()
    }

    /// Reads `key` from the local store, without going through consensus.
    pub fn read_stale(&self, key: Key) -> Option<Value> {
        self.log.store().get(key)
    }

    /// Accepts a client request.
    ///
    /// The operation is proposed to every other member and handed to the
    /// local proposer. `client` is answered once some node announces the
    /// operation's decision.
    pub fn submit(&mut self, request: ClientRequest, client: T) -> Actions<N, T> {
        let operation = self.submitter.accept(request, client);

        let mut actions: Actions<N, T> = self
            .config
            .peers()
            .map(|receiver| Action::Send {
                receiver,
                message: Message::Propose { operation },
            })
            .collect();

        let proposed = self.proposer.submit(operation);
        self.process(proposed, &mut actions);

        actions
    }

    /// Processes a message `sender` sent to this node.
    pub fn handle(&mut self, sender: N, message: Message<N>) -> Actions<N, T> {
        trace!("Received {} from {:?}.", message.kind(), sender);

        if !self.config.members().contains(&sender) {
            warn!(
                "Ignoring {} from non-member {:?}.",
                message.kind(),
                sender
            );
            return Vec::new();
        }

        let mut actions = Vec::new();

        match message {
            Message::Propose { operation } => {
                if self.log.contains(operation.id) {
                    trace!("Operation {} was decided before.", operation.id);
                } else {
                    let proposed = self.proposer.submit(operation);
                    self.process(proposed, &mut actions);
                }
            }

            Message::Record {
                slot,
                step,
                proposal,
            } => {
                let certificate = self.recorder.certify(slot, step, proposal);

                actions.push(Action::Send {
                    receiver: sender,
                    message: Message::RecordOk { slot, certificate },
                });
            }

            Message::RecordOk { slot, certificate } => {
                let proposed = self.proposer.on_certificate(sender, slot, certificate);
                self.process(proposed, &mut actions);
            }

            Message::OpDecision { operation, outcome } => {
                if let Some((client, response)) = self.submitter.resolve(&operation, outcome) {
                    debug!("Answering operation {} with {:?}.", operation.id, response);

                    actions.push(Action::Reply { client, response });
                    actions.push(Action::Emit(Event::Answered {
                        id: operation.id,
                        response,
                    }));
                }
            }
        }

        actions
    }

    fn process(&mut self, proposed: ProposerActions<N>, actions: &mut Actions<N, T>) {
        for action in proposed {
            match action {
                ProposerAction::Broadcast {
                    slot,
                    step,
                    proposal,
                } => {
                    if step == FIRST_STEP {
                        actions.push(Action::Emit(Event::Proposing {
                            slot,
                            operation: proposal.operation,
                        }));
                    }

                    actions.extend(self.config.members().iter().map(|&receiver| {
                        Action::Send {
                            receiver,
                            message: Message::Record {
                                slot,
                                step,
                                proposal,
                            },
                        }
                    }));
                }

                ProposerAction::Contended { slot, step } => {
                    actions.push(Action::Emit(Event::Contention { slot, step }));
                }

                ProposerAction::Decide {
                    slot,
                    step,
                    operation,
                    fast_path,
                } => {
                    let outcome = self.log.apply(slot, operation);

                    actions.push(Action::Send {
                        receiver: operation.origin,
                        message: Message::OpDecision { operation, outcome },
                    });
                    actions.push(Action::Emit(Event::Decided {
                        slot,
                        step,
                        operation,
                        outcome,
                        fast_path,
                    }));
                }
            }
        }
    }
}
