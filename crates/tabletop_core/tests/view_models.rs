use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tabletop_core::{
    AppearancePatch, Background, BoardSettingsForm, CanvasViewModel, ChangeEvent, ChangeNotifier,
    LengthUnit, MessageLevel, MirrorPhase, ModalRequest, ObjectPatch, PanZoomState,
    RuntimeConfig, SessionSnapshot, Shape, TableRuntime, TableService, UiMessage, UiViewModel,
    VttObject,
};

fn started_runtime() -> TableRuntime {
    let runtime = TableRuntime::new(&RuntimeConfig::default()).expect("default config");
    runtime.start();
    runtime
}

fn collect_messages(ui: &UiViewModel) -> Rc<RefCell<Vec<UiMessage>>> {
    let messages = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&messages);
    ui.on_message(move |message| sink.borrow_mut().push(message.clone()));
    messages
}

fn collect_inspector(ui: &UiViewModel) -> Rc<RefCell<Vec<Option<VttObject>>>> {
    let shown = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shown);
    ui.on_inspector_data_changed(move |selected| sink.borrow_mut().push(selected.cloned()));
    shown
}

fn form(width: &str, height: &str, scale: &str) -> BoardSettingsForm {
    BoardSettingsForm {
        width: width.to_string(),
        height: height.to_string(),
        unit_for_dimensions: "cm".to_string(),
        scale_ratio: scale.to_string(),
        unit_for_ratio: "ft".to_string(),
    }
}

#[test]
fn mirrors_track_canonical_state_across_mixed_operations() {
    let runtime = started_runtime();
    let service = runtime.service();

    let a = service
        .create_object(Shape::Rectangle, &ObjectPatch::new().position(10.0, 20.0))
        .unwrap();
    let b = service
        .create_object(Shape::Circle, &ObjectPatch::new().z_index(-1))
        .unwrap();
    service
        .update_object(
            a.id,
            &ObjectPatch::new()
                .size(0.0, 40.0)
                .appearance(AppearancePatch {
                    show_label: Some(true),
                    ..AppearancePatch::default()
                }),
        )
        .unwrap();
    service.set_selected_object_id(Some(b.id)).unwrap();
    service
        .set_table_background(Background::Color("#334455".to_string()))
        .unwrap();
    service
        .set_pan_zoom_state(PanZoomState {
            pan_x: 3.0,
            pan_y: 4.0,
            zoom: 0.5,
        })
        .unwrap();
    assert!(service.delete_object(b.id));
    service
        .create_object(Shape::Circle, &ObjectPatch::new().data(json!({"door": "locked"})))
        .unwrap();

    let snapshot = service.snapshot();
    let canvas_mirror = runtime.canvas().mirror().expect("canvas populated");
    let ui_mirror = runtime.ui().mirror().expect("ui populated");
    assert!(canvas_mirror.matches_snapshot(&snapshot));
    assert!(ui_mirror.matches_snapshot(&snapshot));
    assert_eq!(runtime.canvas().render_list(), snapshot.objects);
    assert_eq!(runtime.ui().selected_object_id(), None);
    assert_eq!(runtime.canvas().pan_zoom().zoom, 0.5);
}

#[test]
fn mirror_built_before_start_misses_earlier_notifications() {
    let notifier = Rc::new(ChangeNotifier::new());
    let service = TableService::in_memory(Rc::clone(&notifier));
    let canvas = CanvasViewModel::new(Rc::clone(&notifier));

    let object = service
        .create_object(Shape::Rectangle, &ObjectPatch::new())
        .unwrap();
    let report = notifier.publish(ChangeEvent::ObjectDeleted(object.id));

    assert_eq!(report.failed, 1);
    assert_eq!(canvas.phase(), MirrorPhase::Uninitialized);
    assert!(canvas.render_list().is_empty());
    assert_eq!(canvas.redraw_requests(), 0);
}

#[test]
fn runtime_start_bulk_loads_objects_created_during_wiring() {
    let runtime = TableRuntime::new(&RuntimeConfig::default()).expect("default config");
    let early = runtime
        .service()
        .create_object(Shape::Circle, &ObjectPatch::new())
        .unwrap();
    assert!(!runtime.is_started());
    assert!(runtime.canvas().render_list().is_empty());

    runtime.start();

    assert!(runtime.is_started());
    assert_eq!(runtime.canvas().object(early.id), Some(early.clone()));
    assert_eq!(runtime.ui().objects(), vec![early]);
}

#[test]
fn runtime_config_seeds_table_state() {
    let config = RuntimeConfig::from_json_str(
        r##"{
            "defaultBackground": {"type": "image", "value": "maps/forest.png"},
            "defaultBoardProperties": {
                "widthUser": 2,
                "heightUser": 3,
                "unitForDimensions": "in",
                "scaleRatio": 5,
                "unitForRatio": "ft"
            }
        }"##,
    )
    .expect("config");
    let runtime = TableRuntime::new(&config).expect("runtime");
    runtime.start();

    assert_eq!(
        runtime.canvas().background(),
        Background::Image("maps/forest.png".to_string())
    );
    let board = runtime.ui().board_properties();
    assert_eq!((board.width_px, board.height_px), (192.0, 288.0));
    assert_eq!(runtime.canvas().pan_zoom(), PanZoomState::default());
}

#[test]
fn canvas_requests_one_redraw_per_notification() {
    let runtime = started_runtime();
    let hook_calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hook_calls);
    runtime
        .canvas()
        .set_redraw_callback(move || counter.set(counter.get() + 1));
    let after_start = runtime.canvas().redraw_requests();
    assert_eq!(after_start, 1);

    let service = runtime.service();
    let object = service
        .create_object(Shape::Rectangle, &ObjectPatch::new())
        .unwrap();
    service
        .update_object(object.id, &ObjectPatch::new().rotation(45.0))
        .unwrap();
    service.clear_all_objects();

    assert_eq!(runtime.canvas().redraw_requests(), after_start + 3);
    assert_eq!(hook_calls.get(), 3);
}

#[test]
fn inspector_clears_when_selected_object_goes_away() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let shown = collect_inspector(ui);
    let service = runtime.service();

    let first = service
        .create_object(Shape::Rectangle, &ObjectPatch::new())
        .unwrap();
    assert!(ui.select_object(Some(first.id)));
    let renamed = ui
        .apply_inspector_edits(&ObjectPatch::new().name("Dragon"))
        .expect("edit selected");
    assert!(ui.delete_selected());

    let second = service
        .create_object(Shape::Circle, &ObjectPatch::new())
        .unwrap();
    assert!(ui.select_object(Some(second.id)));
    ui.confirm_clear_all();

    assert_eq!(
        shown.borrow().as_slice(),
        &[
            Some(first),
            Some(renamed),
            None,
            Some(second),
            None
        ]
    );
    assert_eq!(ui.selected_object(), None);
}

#[test]
fn edits_without_selection_warn_and_change_nothing() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let messages = collect_messages(ui);
    runtime
        .service()
        .create_object(Shape::Rectangle, &ObjectPatch::new())
        .unwrap();

    assert!(ui.apply_inspector_edits(&ObjectPatch::new().rotation(90.0)).is_none());
    assert!(!ui.delete_selected());
    assert!(!ui.open_data_editor());

    assert_eq!(messages.borrow().len(), 3);
    assert!(messages.borrow().iter().all(|message| {
        message.level == MessageLevel::Warning && message.text == "No object selected"
    }));
    assert_eq!(runtime.service().get_all_objects()[0].rotation, 0.0);
}

#[test]
fn selecting_unknown_object_shows_warning() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let messages = collect_messages(ui);

    assert!(!ui.select_object(Some(uuid::Uuid::new_v4())));

    assert_eq!(messages.borrow()[0].level, MessageLevel::Warning);
    assert_eq!(runtime.service().get_selected_object_id(), None);
}

#[test]
fn data_json_editor_merges_valid_objects_and_rejects_the_rest() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let messages = collect_messages(ui);
    let object = runtime
        .service()
        .create_object(Shape::Circle, &ObjectPatch::new().data(json!({"hp": 10})))
        .unwrap();
    ui.select_object(Some(object.id));

    assert!(ui.apply_data_json("{not json").is_none());
    assert!(ui.apply_data_json("[1, 2]").is_none());
    let updated = ui
        .apply_data_json(r#"{"ac": 15}"#)
        .expect("valid data json");

    let messages = messages.borrow();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].text.starts_with("Invalid JSON data:"));
    assert_eq!(messages[1].level, MessageLevel::Error);
    assert_eq!(updated.data.get("hp"), Some(&json!(10)));
    assert_eq!(updated.data.get("ac"), Some(&json!(15)));
    assert_eq!(ui.selected_object(), Some(updated));
}

#[test]
fn board_settings_form_accepts_literal_zero_only() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let messages = collect_messages(ui);
    let broadcast = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&broadcast);
    ui.on_board_settings_changed(move |properties| sink.borrow_mut().push(properties.clone()));

    let stored = ui
        .apply_board_settings(&form("50", "25.4", "0"))
        .expect("literal zero scale");
    assert_eq!(stored.scale_ratio, 0.0);
    assert_eq!(stored.unit_for_dimensions, LengthUnit::Centimeter);
    assert_eq!(stored.unit_for_ratio, LengthUnit::Foot);
    assert_eq!(stored.width_px, 1890.0);
    assert_eq!(stored.height_px, 960.0);

    assert!(ui.apply_board_settings(&form("50", "25", "1e-400")).is_none());
    assert!(ui.apply_board_settings(&form("wide", "25", "1")).is_none());
    assert!(ui.apply_board_settings(&form("50", "25", "-2")).is_none());

    let levels: Vec<MessageLevel> = messages.borrow().iter().map(|m| m.level).collect();
    assert_eq!(
        levels,
        vec![
            MessageLevel::Success,
            MessageLevel::Error,
            MessageLevel::Error,
            MessageLevel::Error
        ]
    );
    assert_eq!(messages.borrow()[0].text, "Board settings updated");
    assert_eq!(broadcast.borrow().as_slice(), &[stored.clone()]);
    assert_eq!(runtime.canvas().board_properties(), stored);
}

#[test]
fn background_actions_trim_input_and_reject_blank() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let messages = collect_messages(ui);

    assert!(ui.set_background_image("  maps/dungeon.jpg "));
    assert_eq!(
        runtime.canvas().background(),
        Background::Image("maps/dungeon.jpg".to_string())
    );
    assert!(!ui.set_background_color("   "));
    assert_eq!(messages.borrow()[0].level, MessageLevel::Error);
    assert_eq!(
        ui.background(),
        Background::Image("maps/dungeon.jpg".to_string())
    );
}

#[test]
fn modal_requests_carry_selected_object_content() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let requests = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&requests);
    ui.on_modal_request(move |request| sink.borrow_mut().push(request.clone()));

    let object = runtime
        .service()
        .create_object(
            Shape::Rectangle,
            &ObjectPatch::new()
                .data(json!({"trap": true}))
                .on_click("openDoor()"),
        )
        .unwrap();
    ui.select_object(Some(object.id));

    ui.request_clear_all();
    assert!(ui.open_data_editor());
    assert!(ui.open_script_editor());

    let requests = requests.borrow();
    assert_eq!(requests[0], ModalRequest::ConfirmClearAll);
    match &requests[1] {
        ModalRequest::EditObjectData { object_id, json } => {
            assert_eq!(*object_id, object.id);
            let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, json!({"trap": true}));
        }
        other => panic!("unexpected modal request: {other:?}"),
    }
    assert_eq!(
        requests[2],
        ModalRequest::EditOnClickScript {
            object_id: object.id,
            script: "openDoor()".to_string()
        }
    );
    assert_eq!(runtime.service().object_count(), 1);
}

#[test]
fn script_editor_updates_on_click_handler() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let object = runtime
        .service()
        .create_object(Shape::Circle, &ObjectPatch::new())
        .unwrap();
    ui.select_object(Some(object.id));

    let updated = ui
        .apply_on_click_script("rollDice(20)")
        .expect("script saved");

    assert_eq!(updated.scripts.on_click, "rollDice(20)");
    assert_eq!(
        runtime.canvas().object(object.id).map(|o| o.scripts.on_click),
        Some("rollDice(20)".to_string())
    );
}

#[test]
fn loading_a_session_resyncs_started_mirrors() {
    let source = started_runtime();
    let object = source
        .service()
        .create_object(Shape::Rectangle, &ObjectPatch::new().name("Chest"))
        .unwrap();
    source.service().set_selected_object_id(Some(object.id)).unwrap();
    let text = source.export_session().to_json_string().expect("export");

    let target = started_runtime();
    target
        .service()
        .create_object(Shape::Circle, &ObjectPatch::new())
        .unwrap();
    let snapshot = SessionSnapshot::from_json_str(&text).expect("import");
    assert_eq!(target.load_session(snapshot).unwrap(), 1);

    let exported = target.export_session();
    assert!(target.canvas().mirror().unwrap().matches_snapshot(&exported));
    assert!(target.ui().mirror().unwrap().matches_snapshot(&exported));
    assert_eq!(
        target.ui().selected_object().map(|o| o.name),
        Some("Chest".to_string())
    );
}

#[test]
fn dropped_view_model_unsubscribes() {
    let notifier = Rc::new(ChangeNotifier::new());
    let service = Rc::new(TableService::in_memory(Rc::clone(&notifier)));
    let ui = UiViewModel::new(Rc::clone(&service));
    let canvas = CanvasViewModel::new(Rc::clone(&notifier));
    assert_eq!(
        notifier.subscriber_count(tabletop_core::ChangeKind::ObjectAdded),
        2
    );

    drop(ui);
    drop(canvas);

    assert_eq!(
        notifier.subscriber_count(tabletop_core::ChangeKind::ObjectAdded),
        0
    );
}

#[test]
fn table_view_display_follows_background_and_pan_zoom() {
    let runtime = started_runtime();
    let ui = runtime.ui();
    let shown = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shown);
    ui.on_table_view_changed(move |background, pan_zoom| {
        sink.borrow_mut().push((background.clone(), *pan_zoom));
    });
    let board_calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&board_calls);
    ui.on_board_settings_changed(move |_| counter.set(counter.get() + 1));

    assert!(ui.set_background_color("#202020"));
    let view = PanZoomState {
        pan_x: 15.0,
        pan_y: -5.0,
        zoom: 2.0,
    };
    runtime.service().set_pan_zoom_state(view).unwrap();

    let dark = Background::Color("#202020".to_string());
    assert_eq!(
        shown.borrow().as_slice(),
        &[(dark.clone(), PanZoomState::default()), (dark, view)]
    );
    assert_eq!(board_calls.get(), 0);
}
