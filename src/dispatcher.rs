//! Dispatcher (§4.5): owns the transport, the per-endpoint sessions, the
//! demultiplexing map, and the overall deadline. Grounded in the teacher
//! pack's `yaleman-goatns` `servers.rs` for the bind → loop → timeout shape
//! of a Tokio UDP server, adapted here to a client that fans requests out
//! instead of replying to them.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant as TokioInstant;
use tracing::{debug, info, warn};

use crate::codec::packet::read_framing;
use crate::config::QueryConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::resolver::Resolver;
use crate::session::{Session, StageEvent};
use crate::transport::Transport;

/// One endpoint to query, per §6's "Endpoint input".
#[derive(Clone, Debug)]
pub struct QueryTarget {
    pub host: String,
    pub port: u16,
}

impl QueryTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        QueryTarget {
            host: host.into(),
            port,
        }
    }
}

/// Run a full query against `targets`, delivering events to `events` as
/// they occur and a single terminal `Event::Done` when the overall deadline
/// passes or every endpoint completes, whichever comes first.
///
/// Returns `Err` only for a fatal transport failure (bind/send/recv);
/// per-endpoint parse and protocol errors are surfaced as `Event::Error`
/// and do not stop the run.
pub async fn run_query(
    targets: Vec<QueryTarget>,
    resolver: Arc<dyn Resolver>,
    transport: Arc<dyn Transport>,
    config: QueryConfig,
    events: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let resolved = resolve_all(&targets, resolver).await;

    let mut sessions = Vec::with_capacity(targets.len());
    let mut demux: HashMap<SocketAddr, usize> = HashMap::new();

    for (idx, (target, resolution)) in targets.iter().zip(resolved.into_iter()).enumerate() {
        let address = match resolution.and_then(|addrs| {
            addrs.first().copied().ok_or_else(|| Error::Resolve {
                host: target.host.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "resolver returned no addresses",
                ),
            })
        }) {
            Ok(addr) => addr,
            Err(e) => {
                warn!(host = %target.host, error = %e, "resolution failed, endpoint will never complete");
                let _ = events.send(Event::Error(e));
                Ipv4Addr::UNSPECIFIED
            }
        };

        let endpoint = Endpoint::new(target.host.clone(), address, target.port);
        let session = Session::new(endpoint);

        if address != Ipv4Addr::UNSPECIFIED {
            let addr = session.endpoint.socket_addr();
            demux.insert(addr, idx);
            let request = session.initial_request();
            transport.send_to(&request, addr).await?;
        }

        sessions.push(session);
    }

    let deadline = TokioInstant::now() + config.timeout;
    let mut timed_out = false;

    loop {
        if sessions.iter().all(Session::is_done) {
            break;
        }

        let mut buf = [0u8; 65_536];
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                info!("overall deadline reached with endpoints still incomplete");
                timed_out = true;
                break;
            }
            received = transport.recv_from(&mut buf) => {
                match received {
                    Ok((n, addr)) => {
                        handle_datagram(&mut sessions, &demux, &buf[..n], addr, &events, transport.as_ref()).await;
                    }
                    Err(e) => {
                        transport.close().await?;
                        return Err(e);
                    }
                }
            }
        }
    }

    transport.close().await?;

    let endpoints: Vec<Endpoint> = sessions.into_iter().map(|s| s.endpoint).collect();
    let _ = events.send(Event::Done {
        endpoints,
        timed_out,
    });

    Ok(())
}

async fn resolve_all(
    targets: &[QueryTarget],
    resolver: Arc<dyn Resolver>,
) -> Vec<Result<Vec<Ipv4Addr>>> {
    let mut set = JoinSet::new();
    for (idx, target) in targets.iter().cloned().enumerate() {
        let resolver = resolver.clone();
        set.spawn(async move {
            let result = resolver.resolve(&target.host).await;
            (idx, result)
        });
    }

    let mut results: Vec<Option<Result<Vec<Ipv4Addr>>>> = (0..targets.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        if let Ok((idx, result)) = joined {
            results[idx] = Some(result);
        }
    }

    results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| Err(Error::Resolve {
            host: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "resolution task panicked"),
        })))
        .collect()
}

async fn handle_datagram(
    sessions: &mut [Session],
    demux: &HashMap<SocketAddr, usize>,
    data: &[u8],
    addr: SocketAddr,
    events: &mpsc::UnboundedSender<Event>,
    transport: &dyn Transport,
) {
    let Some(&idx) = demux.get(&addr) else {
        let _ = events.send(Event::Error(Error::UnknownSource(addr)));
        return;
    };

    let session = &mut sessions[idx];
    if session.is_done() {
        debug!(endpoint = idx, "discarding datagram for completed endpoint");
        return;
    }

    let (is_multi, rest) = match read_framing(data) {
        Ok(v) => v,
        Err(e) => {
            let _ = events.send(Event::Error(e));
            return;
        }
    };

    let outcome = if is_multi {
        session.accept_fragment(rest)
    } else {
        session.accept_single(rest).map(Some)
    };

    match outcome {
        Ok(Some(advance)) => {
            debug!(endpoint = idx, "stage advanced");
            emit(events, idx, advance.event, session);
            if let Some(request) = advance.next_request {
                if let Err(e) = transport.send_to(&request, addr).await {
                    let _ = events.send(Event::Error(e));
                }
            }
        }
        Ok(None) => {
            debug!(endpoint = idx, "fragment stored, reassembly incomplete");
        }
        Err(e) => {
            warn!(endpoint = idx, error = %e, "stage failed");
            let _ = events.send(Event::Error(e));
        }
    }
}

fn emit(events: &mpsc::UnboundedSender<Event>, idx: usize, event: StageEvent, session: &Session) {
    let sent = match event {
        StageEvent::Info(info) => events.send(Event::Info(idx, info)),
        StageEvent::Players => events.send(Event::Player(
            idx,
            session
                .endpoint
                .players
                .clone()
                .expect("players just stored"),
        )),
        StageEvent::Rules => events.send(Event::Rules(
            idx,
            session.endpoint.rules.clone().expect("rules just stored"),
        )),
        StageEvent::Ping(ms) => events.send(Event::Ping(idx, ms)),
        StageEvent::Challenge(token) => events.send(Event::Challenge(idx, token)),
    };
    let _ = sent;
}
