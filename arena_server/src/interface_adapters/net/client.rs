use crate::interface_adapters::framing::{LineFramer, LineTooLong};
use crate::interface_adapters::protocol::{DecodeError, decode_intent, encode_handshake, parse_name};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_player_id;
use crate::use_cases::{GameEvent, Payload};

use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Io(std::io::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    #[allow(dead_code)]
    LineTooLong(usize),
    InputClosed,
    ClosedBeforeName,
}

impl From<std::io::Error> for NetError {
    fn from(e: std::io::Error) -> Self {
        NetError::Io(e)
    }
}

impl From<LineTooLong> for NetError {
    fn from(e: LineTooLong) -> Self {
        NetError::LineTooLong(e.pending)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const READ_BUFFER_LEN: usize = 4096;

/// Drives one client from handshake to teardown.
pub async fn handle_connection(stream: TcpStream, peer: SocketAddr, state: Arc<AppState>) {
    let player_id = next_player_id();
    let span = info_span!("conn", conn_id = player_id, %peer);

    async move {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "failed to set TCP_NODELAY");
        }
        let (reader, writer) = stream.into_split();

        let mut ctx = match bootstrap_connection(player_id, reader, writer, &state).await {
            Ok(ctx) => ctx,
            Err(NetError::ClosedBeforeName) => {
                info!("client disconnected before sending a name");
                return;
            }
            Err(e) => {
                warn!(error = ?e, "failed to bootstrap connection");
                return;
            }
        };

        if let Err(e) = run_client_loop(&mut ctx).await {
            warn!(error = ?e, "client loop exited with error");
        }
        disconnect_cleanup(&ctx).await;
    }
    .instrument(span)
    .await
}

struct ConnCtx {
    pub player_id: u64,
    pub reader: OwnedReadHalf,
    pub framer: LineFramer,
    pub input_tx: mpsc::Sender<GameEvent>,

    pub lines_in: u64,
    pub bytes_in: u64,
    pub invalid_lines: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,
}

/// Connecting -> AwaitingName: greet the client, wait for its name, then hand the
/// outbound stream to the world task.
async fn bootstrap_connection(
    player_id: u64,
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    state: &AppState,
) -> Result<ConnCtx, NetError> {
    let handshake = encode_handshake(player_id, &state.arena).map_err(NetError::Serialization)?;
    writer.write_all(handshake.as_bytes()).await?;

    let mut framer = LineFramer::new();
    let mut bytes_in = 0u64;
    let name_line = loop {
        if let Some(line) = framer.next_line() {
            break line;
        }
        let mut buf = [0u8; READ_BUFFER_LEN];
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Err(NetError::ClosedBeforeName);
        }
        bytes_in += n as u64;
        framer.push(&buf[..n])?;
    };
    let name = parse_name(&name_line);

    // The writer task exists before Join so the `join: true` record has somewhere to go.
    let (outbound_tx, outbound_rx) = mpsc::channel::<Payload>(state.outbound_capacity.max(1));
    tokio::spawn(run_writer(writer, outbound_rx).in_current_span());

    state
        .input_tx
        .send(GameEvent::Join {
            player_id,
            name: name.clone(),
            outbound_tx,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;

    info!(player_id, name = %name, "client connected");

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        reader,
        framer,
        input_tx: state.input_tx.clone(),

        lines_in: 1,
        bytes_in,
        invalid_lines: 0,

        last_input_full_log: now,
        last_invalid_input_log: now,
    })
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Active: every complete line is one intent. Returns when the socket closes or fails.
async fn run_client_loop(ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut buf = [0u8; READ_BUFFER_LEN];
    loop {
        // Lines that arrived together with the name are handled before the first read.
        while let Some(line) = ctx.framer.next_line() {
            ctx.lines_in += 1;
            process_line(ctx, &line)?;
        }

        let n = match ctx.reader.read(&mut buf).await {
            Ok(0) => {
                info!(player_id = ctx.player_id, "socket closed by peer");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) => {
                warn!(player_id = ctx.player_id, error = %e, "socket read error");
                return Ok(());
            }
        };
        ctx.bytes_in += n as u64;
        ctx.framer.push(&buf[..n])?;
    }
}

/// Malformed lines are counted and dropped; the connection stays up.
fn process_line(ctx: &mut ConnCtx, line: &str) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    let intent = match decode_intent(line) {
        Ok(intent) => intent,
        Err(DecodeError::Blank) => return Ok(()),
        Err(e) => {
            ctx.invalid_lines += 1;
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(player_id, bytes = line.len(), error = %e, "discarding invalid intent");
            }
            return Ok(());
        }
    };

    match ctx.input_tx.try_send(GameEvent::Intent { player_id, intent }) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_evt)) => {
            if should_log(&mut ctx.last_input_full_log) {
                warn!(player_id, "input channel full; dropping intent");
            }
            Ok(())
        }
        Err(TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

/// Drains the outbound queue onto the socket. Ends when the world drops the sender or
/// a write fails; either way the socket is shut down.
async fn run_writer(mut writer: OwnedWriteHalf, mut outbound_rx: mpsc::Receiver<Payload>) {
    let mut msgs_out = 0u64;
    let mut bytes_out = 0u64;

    while let Some(payload) = outbound_rx.recv().await {
        if let Err(e) = writer.write_all(payload.as_bytes()).await {
            warn!(error = %e, "socket write failed");
            break;
        }
        msgs_out += 1;
        bytes_out += payload.len() as u64;
    }

    // Dropping the receiver here lets the world task see the connection as closed.
    drop(outbound_rx);
    let _ = writer.shutdown().await;
    debug!(msgs_out, bytes_out, "writer stopped");
}

async fn disconnect_cleanup(ctx: &ConnCtx) {
    let player_id = ctx.player_id;
    if ctx
        .input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .is_err()
    {
        warn!(player_id, "world task gone during disconnect");
    }

    debug!(
        player_id,
        lines_in = ctx.lines_in,
        bytes_in = ctx.bytes_in,
        invalid_lines = ctx.invalid_lines,
        pending_bytes = ctx.framer.pending_len(),
        "connection stats"
    );
    info!(player_id, "client disconnected");
}
