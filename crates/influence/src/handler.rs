//! Request dispatch: the boundary with the routing layer.
//!
//! The routing layer (HTTP, WebSocket, whatever) parses the path and the
//! bearer token, builds a [`Request`], and gets back either a
//! [`Response`] or an error code. Status mapping stays on its side.

use influence_match::{EventPublisher, MatchService, OnboardingResult};
use influence_protocol::{
    Codec, CreateMatchRequest, DeclareActionRequest, DeclaredAction, JoinMatchRequest, JsonCodec,
    MatchId, PrivateHand, PublicMatchState,
};
use influence_store::KvStore;
use serde::Serialize;

use crate::InfluenceError;

/// One player intent, as handed over by the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Open a new match; the caller becomes admin.
    Create(CreateMatchRequest),

    /// Take a seat in the match behind a join code.
    Join(JoinMatchRequest),

    /// Deal the cards. Admin only.
    Start { match_id: MatchId, token: String },

    /// Declare an action. `body` is the raw request body, decoded here as
    /// a [`DeclareActionRequest`].
    Declare {
        match_id: MatchId,
        token: String,
        body: Vec<u8>,
    },

    /// Read the public view.
    State { match_id: MatchId, token: String },

    /// Read the caller's own hand.
    Hand { match_id: MatchId, token: String },
}

impl Request {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Create(_) => "create",
            Request::Join(_) => "join",
            Request::Start { .. } => "start",
            Request::Declare { .. } => "declare",
            Request::State { .. } => "state",
            Request::Hand { .. } => "hand",
        }
    }
}

/// A successful result, serialized as the bare inner value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// From `Create` and `Join`: the view, the new seat, and its token.
    Onboarded(OnboardingResult),
    /// From `Start` and `State`.
    State(PublicMatchState),
    /// From `Declare`: the action record.
    Action(DeclaredAction),
    /// From `Hand`.
    Hand(PrivateHand),
}

/// Routes one request to the service.
pub(crate) async fn dispatch<S, P>(
    service: &MatchService<S, P>,
    codec: &JsonCodec,
    request: Request,
) -> Result<Response, InfluenceError>
where
    S: KvStore,
    P: EventPublisher,
{
    let response = match request {
        Request::Create(body) => Response::Onboarded(service.create_match(&body.nickname).await?),
        Request::Join(body) => Response::Onboarded(
            service
                .join_match(&body.join_code, &body.nickname)
                .await?,
        ),
        Request::Start { match_id, token } => {
            Response::State(service.start_match(&match_id, &token).await?)
        }
        Request::Declare {
            match_id,
            token,
            body,
        } => {
            let body: DeclareActionRequest = codec.decode(&body)?;
            Response::Action(service.declare_action(&match_id, &token, &body).await?)
        }
        Request::State { match_id, token } => {
            Response::State(service.public_state(&match_id, &token).await?)
        }
        Request::Hand { match_id, token } => {
            Response::Hand(service.private_hand(&match_id, &token).await?)
        }
    };
    Ok(response)
}
