use std::collections::VecDeque;

use super::{Command, CommandResponse, Session, TransportError};

/// Replays a script of expected commands and the responses to answer them with.
pub struct MockSession {
    script: VecDeque<(String, Result<CommandResponse, TransportError>)>,
}

impl MockSession {
    pub fn new<'a>(
        script: impl IntoIterator<Item = (&'a str, Result<CommandResponse, TransportError>)>,
    ) -> Self {
        Self {
            script: script
                .into_iter()
                .map(|(command, response)| (command.to_string(), response))
                .collect(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl Session for MockSession {
    async fn send(&mut self, command: &Command) -> Result<CommandResponse, TransportError> {
        let (expected, response) = self
            .script
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command {command}"));
        assert_eq!(expected, command.to_string());

        response
    }
}

#[tokio::test]
async fn should_replay_script_in_order() {
    let mut session = MockSession::new([
        (r#"LIST "" "*""#, Ok(CommandResponse::ok(Vec::new()))),
        (r#"LSUB "" "*""#, Ok(CommandResponse::no())),
    ]);

    let listed = session.send(&Command::List).await;
    let subscribed = session.send(&Command::Lsub).await;

    assert!(listed.is_ok_and(|response| response.is_ok()));
    assert!(subscribed.is_ok_and(|response| !response.is_ok()));
    assert!(session.is_exhausted());
}
