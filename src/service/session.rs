//! Module `session`
//!
//! Runs the service side of one connection: reads the top-level command and
//! drives the matching sub-protocol against the service state. Every branch
//! ends the connection after its terminal reply.

use log::{debug, info};
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::auth::{validate_password, validate_user};
use crate::config::ServiceConfig;
use crate::error::{AuthError, ServiceError};
use crate::protocol::responses::format_flag_reply;
use crate::protocol::{Command, FaultCommand, Reply, parse_command, read_token, write_token};
use crate::service::state::ServiceState;

/// What a connection received so far. Lives as long as the connection.
#[derive(Debug)]
pub struct Session {
    peer: SocketAddr,
    command: Option<Command>,
    login: Option<String>,
    password: Option<String>,
}

impl Session {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            command: None,
            login: None,
            password: None,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Peer closed before sending a command.
    Closed,
    /// Peer closed partway through a sub-protocol.
    Abandoned,
    Registered(String),
    /// Registration is disabled; the connection was dropped without a reply.
    RegistrationRefused,
    LoginExists(String),
    Rejected(AuthError),
    Stored(String),
    Retrieved(String),
    FlagMissing(String),
    Fault(FaultCommand),
    Unknown(String),
}

/// Line-level access to the two halves of a connection.
struct Exchange<R, W> {
    reader: R,
    writer: W,
    max_line_length: usize,
}

impl<R, W> Exchange<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn recv(&mut self) -> Result<Option<String>, ServiceError> {
        Ok(read_token(&mut self.reader, self.max_line_length).await?)
    }

    async fn send(&mut self, token: &str) -> Result<(), ServiceError> {
        Ok(write_token(&mut self.writer, token).await?)
    }

    async fn reply(&mut self, reply: Reply) -> Result<(), ServiceError> {
        self.send(reply.as_str()).await
    }
}

/// Handles one connection to completion.
///
/// The stream is closed when this returns, whatever the outcome.
pub async fn handle_session<S>(
    stream: S,
    peer: SocketAddr,
    state: &mut ServiceState,
    config: &ServiceConfig,
) -> Result<SessionOutcome, ServiceError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut exchange = Exchange {
        reader: BufReader::new(read_half),
        writer: write_half,
        max_line_length: config.max_line_length,
    };
    let mut session = Session::new(peer);

    let result = run_session(&mut exchange, &mut session, state, config).await;

    let _ = exchange.writer.shutdown().await;
    debug!(
        "Session {} closed (command: {:?}, login: {:?}, password given: {})",
        session.peer(),
        session.command(),
        session.login(),
        session.has_password()
    );

    result
}

async fn run_session<R, W>(
    exchange: &mut Exchange<R, W>,
    session: &mut Session,
    state: &mut ServiceState,
    config: &ServiceConfig,
) -> Result<SessionOutcome, ServiceError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(line) = exchange.recv().await? else {
        return Ok(SessionOutcome::Closed);
    };

    let command = parse_command(&line);
    info!("Received from {}: {}", session.peer(), command.as_str());
    session.command = Some(command.clone());

    match command {
        Command::Reg => handle_reg(exchange, session, state).await,
        Command::Put | Command::Get => {
            handle_authenticated(exchange, session, state, config).await
        }
        Command::Fault(FaultCommand::Sleep) => {
            tokio::time::sleep(config.sleep_delay()).await;
            // SLEEP is not a served command once the stall is over
            exchange.reply(Reply::Nook).await?;
            Ok(SessionOutcome::Fault(FaultCommand::Sleep))
        }
        Command::Fault(fault) => {
            apply_fault(state, fault, config);
            Ok(SessionOutcome::Fault(fault))
        }
        Command::Unknown(raw) => {
            exchange.reply(Reply::Nook).await?;
            Ok(SessionOutcome::Unknown(raw))
        }
    }
}

/// Flips fault switches. No reply is sent.
fn apply_fault(state: &mut ServiceState, fault: FaultCommand, config: &ServiceConfig) {
    match fault {
        FaultCommand::Clear => {
            info!("Clearing {} stored flags", state.flags.len());
            state.flags.clear();
        }
        FaultCommand::RegFail => {
            info!("Registration disabled");
            state.faults.registration_disabled = true;
        }
        FaultCommand::RegOk => {
            info!("Registration enabled");
            state.faults.registration_disabled = false;
        }
        FaultCommand::DataFail => state.apply_datafail(config.datafail_mode),
        FaultCommand::Sleep => {}
    }
}

/// REG: login, then password. Disabled registration drops the connection unanswered.
async fn handle_reg<R, W>(
    exchange: &mut Exchange<R, W>,
    session: &mut Session,
    state: &mut ServiceState,
) -> Result<SessionOutcome, ServiceError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if state.faults.registration_disabled {
        return Ok(SessionOutcome::RegistrationRefused);
    }

    exchange.reply(Reply::Ok).await?;

    let Some(login) = exchange.recv().await? else {
        return Ok(SessionOutcome::Abandoned);
    };
    session.login = Some(login.clone());

    if state.users.contains(&login) {
        exchange.reply(Reply::Exist).await?;
        return Ok(SessionOutcome::LoginExists(login));
    }
    exchange.reply(Reply::Ok).await?;

    let Some(password) = exchange.recv().await? else {
        return Ok(SessionOutcome::Abandoned);
    };

    if let Err(e) = state.users.register(&login, &password) {
        exchange.reply(Reply::Exist).await?;
        return Ok(SessionOutcome::Rejected(e));
    }
    session.password = Some(password);

    exchange.reply(Reply::Ok).await?;
    info!("Registered user {}", login);
    Ok(SessionOutcome::Registered(login))
}

/// PUT and GET share the credential exchange, then store or return the flag.
async fn handle_authenticated<R, W>(
    exchange: &mut Exchange<R, W>,
    session: &mut Session,
    state: &mut ServiceState,
    config: &ServiceConfig,
) -> Result<SessionOutcome, ServiceError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    exchange.reply(Reply::Ok).await?;

    let Some(login) = exchange.recv().await? else {
        return Ok(SessionOutcome::Abandoned);
    };
    session.login = Some(login.clone());

    if let Err(e) = validate_user(&state.users, &login) {
        exchange.reply(Reply::Incorrect).await?;
        return Ok(SessionOutcome::Rejected(e));
    }
    exchange.reply(Reply::Ok).await?;

    let Some(password) = exchange.recv().await? else {
        return Ok(SessionOutcome::Abandoned);
    };

    if let Err(e) = validate_password(&state.users, &login, &password) {
        exchange.reply(Reply::Incorrect).await?;
        return Ok(SessionOutcome::Rejected(e));
    }
    session.password = Some(password);
    exchange.reply(Reply::Ok).await?;

    if session.command() == Some(&Command::Put) {
        let Some(flag) = exchange.recv().await? else {
            return Ok(SessionOutcome::Abandoned);
        };
        state.store_flag(&login, &flag, &config.corruption_marker);
        exchange.reply(Reply::Ok).await?;
        return Ok(SessionOutcome::Stored(login));
    }

    let Some(flag) = state.flags.get(&login).map(str::to_string) else {
        exchange.reply(Reply::Nook).await?;
        return Ok(SessionOutcome::FlagMissing(login));
    };

    tokio::time::sleep(config.get_delay()).await;
    exchange.send(&format_flag_reply(&flag)).await?;
    Ok(SessionOutcome::Retrieved(login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataFailMode;
    use tokio::io::{AsyncReadExt, DuplexStream};

    fn test_config() -> ServiceConfig {
        ServiceConfig {
            sleep_delay_secs: 0,
            get_delay_ms: 0,
            ..ServiceConfig::default()
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    /// Sends `input` as the client, then returns everything the service wrote.
    async fn run(
        input: &str,
        state: &mut ServiceState,
        config: &ServiceConfig,
    ) -> (SessionOutcome, String) {
        let (client, server): (DuplexStream, DuplexStream) = tokio::io::duplex(4096);
        let (mut client_read, mut client_write) = tokio::io::split(client);
        let input = input.to_string();

        let client_task = async move {
            client_write.write_all(input.as_bytes()).await.unwrap();
            client_write.shutdown().await.unwrap();
            let mut output = String::new();
            client_read.read_to_string(&mut output).await.unwrap();
            output
        };

        let (outcome, output) = tokio::join!(handle_session(server, peer(), state, config), client_task);
        (outcome.unwrap(), output)
    }

    fn registered(login: &str, password: &str) -> ServiceState {
        let mut state = ServiceState::new();
        state.users.register(login, password).unwrap();
        state
    }

    #[tokio::test]
    async fn test_reg() {
        let mut state = ServiceState::new();
        let (outcome, output) = run("REG\nalice\n1234567890\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::Registered("alice".into()));
        assert_eq!(output, "OK\nOK\nOK\n");
        assert_eq!(state.users.password("alice"), Some("1234567890"));
    }

    #[tokio::test]
    async fn test_reg_existing_login() {
        let mut state = registered("alice", "1234567890");
        let (outcome, output) = run("REG\nalice\n0000000000\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::LoginExists("alice".into()));
        assert_eq!(output, "OK\nEXIST\n");
        assert_eq!(state.users.password("alice"), Some("1234567890"));
    }

    #[tokio::test]
    async fn test_reg_disabled_closes_without_reply() {
        let mut state = ServiceState::new();
        state.faults.registration_disabled = true;
        let (outcome, output) = run("REG\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::RegistrationRefused);
        assert_eq!(output, "");
        assert!(state.users.is_empty());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let mut state = registered("alice", "1234567890");
        let config = test_config();

        let (outcome, output) = run("PUT\nalice\n1234567890\nFLAG{abc}\n", &mut state, &config).await;
        assert_eq!(outcome, SessionOutcome::Stored("alice".into()));
        assert_eq!(output, "OK\nOK\nOK\nOK\n");

        let (outcome, output) = run("GET\nalice\n1234567890\n", &mut state, &config).await;
        assert_eq!(outcome, SessionOutcome::Retrieved("alice".into()));
        assert_eq!(output, "OK\nOK\nOK\nFLAG{abc}\nOK\n");
    }

    #[tokio::test]
    async fn test_unknown_login_is_incorrect() {
        let mut state = ServiceState::new();
        let (outcome, output) = run("GET\nbob\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::Rejected(AuthError::UserNotFound("bob".into())));
        assert_eq!(output, "OK\nINCORRECT\n");
    }

    #[tokio::test]
    async fn test_wrong_password_is_incorrect() {
        let mut state = registered("alice", "1234567890");
        let (outcome, output) = run("PUT\nalice\n1111111111\nFLAG\n", &mut state, &test_config()).await;
        assert_eq!(
            outcome,
            SessionOutcome::Rejected(AuthError::InvalidPassword("alice".into()))
        );
        assert_eq!(output, "OK\nOK\nINCORRECT\n");
        assert!(state.flags.is_empty());
    }

    #[tokio::test]
    async fn test_get_without_flag_is_nook() {
        let mut state = registered("alice", "1234567890");
        let (outcome, output) = run("GET\nalice\n1234567890\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::FlagMissing("alice".into()));
        assert_eq!(output, "OK\nOK\nOK\nNOOK\n");
    }

    #[tokio::test]
    async fn test_fault_commands_send_nothing() {
        let mut state = registered("alice", "1234567890");
        state.store_flag("alice", "FLAG", "_");
        let config = test_config();

        let (outcome, output) = run("REGFAIL\n", &mut state, &config).await;
        assert_eq!(outcome, SessionOutcome::Fault(FaultCommand::RegFail));
        assert_eq!(output, "");
        assert!(state.faults.registration_disabled);

        run("REGOK\n", &mut state, &config).await;
        assert!(!state.faults.registration_disabled);

        run("CLEAR\n", &mut state, &config).await;
        assert!(state.flags.is_empty());
        assert!(state.users.contains("alice"));
    }

    #[tokio::test]
    async fn test_datafail_modes() {
        let mut state = registered("alice", "1234567890");
        let mut config = test_config();

        run("DATAFAIL\n", &mut state, &config).await;
        assert!(!state.faults.data_corruption_enabled);

        config.datafail_mode = DataFailMode::Corrupt;
        run("DATAFAIL\n", &mut state, &config).await;
        assert!(state.faults.data_corruption_enabled);

        run("PUT\nalice\n1234567890\nFLAG\n", &mut state, &config).await;
        let (_, output) = run("GET\nalice\n1234567890\n", &mut state, &config).await;
        assert_eq!(output, "OK\nOK\nOK\nFLAG_\nOK\n");
    }

    #[tokio::test]
    async fn test_sleep_then_nook() {
        let mut state = ServiceState::new();
        let (outcome, output) = run("SLEEP\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::Fault(FaultCommand::Sleep));
        assert_eq!(output, "NOOK\n");
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut state = ServiceState::new();
        let (outcome, output) = run("HELLO\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::Unknown("HELLO".into()));
        assert_eq!(output, "NOOK\n");
    }

    async fn session_after(input: &str, state: &mut ServiceState) -> Session {
        let mut exchange = Exchange {
            reader: input.as_bytes(),
            writer: Vec::new(),
            max_line_length: 1024,
        };
        let mut session = Session::new(peer());
        run_session(&mut exchange, &mut session, state, &test_config())
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_session_tracks_accepted_password() {
        let mut state = registered("alice", "1234567890");

        let session = session_after("GET\nalice\nwrong\n", &mut state).await;
        assert_eq!(session.command(), Some(&Command::Get));
        assert_eq!(session.login(), Some("alice"));
        assert!(!session.has_password());

        let session = session_after("PUT\nalice\n1234567890\nFLAG{x}\n", &mut state).await;
        assert_eq!(session.command(), Some(&Command::Put));
        assert!(session.has_password());
    }

    #[tokio::test]
    async fn test_peer_closing_early() {
        let mut state = ServiceState::new();
        let (outcome, _) = run("", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::Closed);

        let (outcome, output) = run("REG\n", &mut state, &test_config()).await;
        assert_eq!(outcome, SessionOutcome::Abandoned);
        assert_eq!(output, "OK\n");
    }
}
