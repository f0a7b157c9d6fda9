use super::ClientMessage;
use super::Envelope;
use super::Protocol;
use super::ProtocolError;
use super::Registry;
use super::ServerMessage;
use crate::PlayerUuid;
use crate::RoomId;
use crate::SessionId;
use crate::game::GameError;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

pub struct Server;

impl Server {
    pub async fn run() -> Result<(), std::io::Error> {
        let registry = web::Data::new(Registry::default());
        log::info!("starting game server");
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(registry.clone())
                .route("/health", web::get().to(health))
                .route("/ws", web::get().to(connect))
        })
        .workers(4)
        .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
        .run()
        .await
    }
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// Upgrades the connection and spawns the bridge task.
async fn connect(
    registry: web::Data<Registry>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            bridge(registry.into_inner(), session, stream);
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Shuttles frames between one WebSocket and its bound room.
///
/// The first successful `create_room` / `join_room` binds the session;
/// everything after forwards as an [`Envelope::Act`]. A dropped socket
/// becomes [`Envelope::Drop`], which is how disconnects reach the
/// reconciler without being errors.
fn bridge(registry: Arc<Registry>, mut session: actix_ws::Session, mut stream: actix_ws::MessageStream) {
    use futures::StreamExt;
    let id = registry.session();
    let (tx, mut rx) = unbounded_channel::<String>();
    actix_web::rt::spawn(async move {
        log::info!("session {} connected", id);
        let mut room: Option<(RoomId, UnboundedSender<Envelope>)> = None;
        'sesh: loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some(json) => if session.text(json).await.is_err() { break 'sesh },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        if let Some(reply) = inbound(&registry, id, &tx, &mut room, &text).await {
                            if session.text(reply).await.is_err() { break 'sesh }
                        }
                    }
                    Some(Ok(actix_ws::Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() { break 'sesh }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
        if let Some((_, ref room)) = room {
            let _ = room.send(Envelope::Drop { session: id });
        }
        log::info!("session {} disconnected", id);
        let _ = session.close(None).await;
    });
}

/// Sends the join envelope and waits for the room's verdict, so a
/// rejected join never binds the connection.
async fn attach(
    tx: &UnboundedSender<Envelope>,
    session: SessionId,
    out: &UnboundedSender<String>,
    name: String,
    uuid: PlayerUuid,
) -> Result<(), GameError> {
    let (ack, verdict) = oneshot::channel();
    tx.send(Envelope::Join {
        session,
        tx: out.clone(),
        name,
        uuid,
        ack,
    })
    .map_err(|_| GameError::RoomNotFound)?;
    verdict.await.map_err(|_| GameError::RoomNotFound)?
}

/// Handles one inbound frame. Returns a direct reply for protocol-level
/// outcomes; room-level events flow back through the session channel.
async fn inbound(
    registry: &Arc<Registry>,
    session: SessionId,
    out: &UnboundedSender<String>,
    room: &mut Option<(RoomId, UnboundedSender<Envelope>)>,
    text: &str,
) -> Option<String> {
    let message = match Protocol::decode(text) {
        Ok(message) => message,
        Err(e) => return Some(ServerMessage::error(e).to_json()),
    };
    match message {
        ClientMessage::CreateRoom {
            room_id,
            settings,
            username,
            player_uuid,
        } => {
            if room.is_some() {
                return Some(ServerMessage::error(ProtocolError::AlreadyInRoom).to_json());
            }
            match registry.clone().create(room_id.clone(), settings).await {
                Ok(tx) => match attach(&tx, session, out, username, player_uuid).await {
                    Ok(()) => {
                        *room = Some((room_id.clone(), tx));
                        Some(ServerMessage::RoomCreated { room_id }.to_json())
                    }
                    Err(e) => Some(ServerMessage::error(e).to_json()),
                },
                Err(e) => Some(ServerMessage::error(e).to_json()),
            }
        }
        ClientMessage::JoinRoom {
            room_id,
            username,
            player_uuid,
        } => {
            if room.is_some() {
                return Some(ServerMessage::error(ProtocolError::AlreadyInRoom).to_json());
            }
            match registry.lookup(&room_id).await {
                Ok(tx) => match attach(&tx, session, out, username, player_uuid).await {
                    Ok(()) => {
                        *room = Some((room_id, tx));
                        None
                    }
                    Err(e) => Some(ServerMessage::error(e).to_json()),
                },
                Err(e) => Some(ServerMessage::error(e).to_json()),
            }
        }
        scoped => match &*room {
            Some((bound, tx)) => {
                if scoped.room_id() != bound {
                    log::debug!(
                        "session {} addressed room {} while bound to {}",
                        session,
                        scoped.room_id(),
                        bound
                    );
                    return Some(ServerMessage::error(ProtocolError::WrongRoom).to_json());
                }
                match scoped.action() {
                    Some(action) => {
                        let _ = tx.send(Envelope::Act { session, action });
                        None
                    }
                    None => None,
                }
            }
            None => Some(ServerMessage::error(ProtocolError::NotInRoom).to_json()),
        },
    }
}
