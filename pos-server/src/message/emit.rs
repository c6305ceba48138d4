//! 领域事件推送辅助
//!
//! 所有推送都是 fire-and-forget：调用方不关心投递结果。

use serde::Serialize;
use shared::message::{EventName, MenuUpdated, OrderPayload, RealtimeEvent, Room};
use shared::models::{Order, PrepStation};

use super::BroadcastPort;

/// Stations that have a display room
pub const STATIONS: [PrepStation; 2] = [PrepStation::Kitchen, PrepStation::Juicebar];

/// Room of a preparation station (`none` has no display)
pub fn station_room(station: PrepStation) -> Option<Room> {
    match station {
        PrepStation::Kitchen => Some(Room::kitchen()),
        PrepStation::Juicebar => Some(Room::juicebar()),
        PrepStation::None => None,
    }
}

pub fn to_room<T: Serialize>(bus: &dyn BroadcastPort, room: &Room, name: EventName, data: &T) {
    bus.publish(room, RealtimeEvent::new(name, data));
}

pub fn to_all<T: Serialize>(bus: &dyn BroadcastPort, name: EventName, data: &T) {
    bus.publish_all(RealtimeEvent::new(name, data));
}

/// Same payload to both station rooms
pub fn to_stations<T: Serialize>(bus: &dyn BroadcastPort, name: EventName, data: &T) {
    let event = RealtimeEvent::new(name, data);
    for station in STATIONS {
        if let Some(room) = station_room(station) {
            bus.publish(&room, event.clone());
        }
    }
}

/// Each station room gets the order reduced to its own lines
///
/// Stations without lines in the order receive nothing.
pub fn order_to_stations(bus: &dyn BroadcastPort, name: EventName, order: &Order) {
    for station in STATIONS {
        let (Some(room), Some(view)) = (station_room(station), order.for_station(station)) else {
            continue;
        };
        to_room(bus, &room, name, &OrderPayload { order: view });
    }
}

/// `menu-updated` to everyone
pub fn menu_updated<T: Serialize>(
    bus: &dyn BroadcastPort,
    action: &str,
    id: Option<&str>,
    item: Option<&T>,
) {
    let payload = MenuUpdated {
        action: action.to_string(),
        id: id.map(str::to_string),
        item: item.and_then(|i| serde_json::to_value(i).ok()),
    };
    to_all(bus, EventName::MenuUpdated, &payload);
}
