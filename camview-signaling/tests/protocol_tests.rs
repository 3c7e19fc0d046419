//! Status exchange between the viewer and remote devices

use camview_core::{ConnectionId, StreamDescriptor};
use camview_signaling::*;
use serde_json::{json, Value};
use tokio_test::assert_ok;

const METADATA: &str = r#"{
    "deviceInfo": {"name": "Lab phone", "model": "A52", "manufacturer": "Samsung", "serial": "R58"},
    "videoDevices": [
        {"deviceId": "d0", "label": "camera2 0, facing back"},
        {"deviceId": "d1", "label": "camera2 1, facing front"}
    ]
}"#;

fn push_status(from: &str, data: &str) -> InboundSignal {
    InboundSignal::new(
        ConnectionId::from(from),
        SignalType::PushStatus.as_str(),
        Some(data.to_string()),
    )
}

fn directory_with(connection: &str) -> UserDirectory {
    let mut directory = UserDirectory::new();
    let stream = StreamDescriptor::new(format!("str_{}", connection), connection, METADATA);
    assert_ok!(register_stream(&mut directory, stream));
    directory
}

#[test]
fn test_fetch_then_push_updates_dynamic_data() {
    let mut directory = UserDirectory::new();
    let stream = StreamDescriptor::new("str_C", "C", METADATA);

    let fetch = register_stream(&mut directory, stream).unwrap().unwrap();
    assert_eq!(fetch.kind, SignalType::FetchStatus);
    assert_eq!(fetch.to, ConnectionId::from("C"));
    assert!(fetch.data.is_none());

    let static_before = directory
        .get_by_connection(&ConnectionId::from("C"))
        .unwrap()
        .static_data()
        .clone();

    let changed = handle_signal(
        &mut directory,
        &push_status("C", r#"{"withAudio": true, "videoDeviceId": "d1"}"#),
    );
    assert_eq!(changed, Some(ConnectionId::from("C")));

    let user = directory.get_by_connection(&ConnectionId::from("C")).unwrap();
    let status = user.dynamic_data().unwrap();
    assert!(status.with_audio);
    assert_eq!(status.video_device_id, "d1");
    assert_eq!(user.static_data(), &static_before);
    assert_eq!(user.current_device_index(), Some(1));
}

#[test]
fn test_push_replaces_previous_status() {
    let mut directory = directory_with("C");
    handle_signal(
        &mut directory,
        &push_status(
            "C",
            r#"{"withAudio": true, "videoDeviceId": "d0", "zoom": {"min": 1, "max": 4, "step": 1}}"#,
        ),
    );
    handle_signal(
        &mut directory,
        &push_status("C", r#"{"withAudio": false, "videoDeviceId": "d1"}"#),
    );

    let user = directory.get_by_connection(&ConnectionId::from("C")).unwrap();
    let status = user.dynamic_data().unwrap();
    assert!(!status.with_audio);
    assert!(status.zoom.is_none());
    assert!(!user.supports(CameraSetting::Zoom));
}

#[test]
fn test_malformed_push_is_dropped() {
    let mut directory = directory_with("C");
    let changed = handle_signal(&mut directory, &push_status("C", "{\"withAudio\": "));
    assert_eq!(changed, None);
    assert!(directory
        .get_by_connection(&ConnectionId::from("C"))
        .unwrap()
        .dynamic_data()
        .is_none());
}

#[test]
fn test_push_from_unknown_connection_is_dropped() {
    let mut directory = directory_with("C");
    let changed = handle_signal(
        &mut directory,
        &push_status("X", r#"{"withAudio": true, "videoDeviceId": "d1"}"#),
    );
    assert_eq!(changed, None);
    assert_eq!(directory.len(), 1);
}

#[test]
fn test_device_bound_and_unknown_types_are_ignored() {
    let mut directory = directory_with("C");
    for kind in ["fetch-status", "flip-sound", "custom-ping"] {
        let signal = InboundSignal::new(ConnectionId::from("C"), kind, Some("{}".to_string()));
        assert_eq!(handle_signal(&mut directory, &signal), None);
    }
}

#[test]
fn test_update_camera_payloads() {
    let to = ConnectionId::from("C");
    let cases = [
        (CameraControl::device("d1"), json!({ "deviceId": "d1" })),
        (
            CameraControl::focus(0.4),
            json!({ "advanced": [{ "focusDistance": 0.4 }] }),
        ),
        (
            CameraControl::zoom(3.5),
            json!({ "advanced": [{ "zoom": 3.5 }] }),
        ),
    ];

    for (control, expected) in cases {
        let signal = DeviceCommand::UpdateCamera(control.clone())
            .to_signal(to.clone())
            .unwrap();
        assert_eq!(signal.kind, SignalType::UpdateCamera);
        assert_eq!(signal.kind.as_str(), "update-camera");

        let payload: Value = serde_json::from_str(signal.data.as_deref().unwrap()).unwrap();
        assert_eq!(payload, expected);

        let decoded: CameraControl = serde_json::from_value(payload).unwrap();
        assert_eq!(decoded, control);
    }
}

#[test]
fn test_stream_destroyed_removes_user() {
    let mut queue = InboundQueue::new();
    let sender = queue.sender();
    let mut directory = UserDirectory::new();

    let stream = StreamDescriptor::new("str_C", "C", METADATA);
    sender.send(SessionEvent::StreamCreated(stream.clone()));
    sender.send(SessionEvent::StreamDestroyed(stream));

    for event in queue.drain() {
        match event {
            SessionEvent::StreamCreated(stream) => {
                assert_ok!(register_stream(&mut directory, stream));
            }
            SessionEvent::StreamDestroyed(stream) => {
                assert!(directory.remove_stream(&stream.stream_id).is_some());
            }
            SessionEvent::Signal(signal) => {
                handle_signal(&mut directory, &signal);
            }
        }
    }

    assert!(directory.is_empty());
}
