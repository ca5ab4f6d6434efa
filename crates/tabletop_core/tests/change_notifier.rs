use std::cell::RefCell;
use std::rc::Rc;
use tabletop_core::{ChangeEvent, ChangeKind, ChangeNotifier, DispatchError};
use uuid::Uuid;

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(
    log: &Log,
    label: &'static str,
) -> impl Fn(&ChangeEvent) -> Result<(), DispatchError> {
    let log = Rc::clone(log);
    move |event| {
        log.borrow_mut().push(format!("{label}:{}", event.kind().as_str()));
        Ok(())
    }
}

#[test]
fn delivers_in_registration_order_only_to_matching_kind() {
    let notifier = ChangeNotifier::new();
    let log: Log = Rc::default();
    notifier.subscribe(ChangeKind::ObjectDeleted, recorder(&log, "first"));
    notifier.subscribe(ChangeKind::SelectionChanged, recorder(&log, "other"));
    notifier.subscribe(ChangeKind::ObjectDeleted, recorder(&log, "second"));

    let report = notifier.publish(ChangeEvent::ObjectDeleted(Uuid::new_v4()));

    assert_eq!(report.kind, ChangeKind::ObjectDeleted);
    assert_eq!(report.delivered, 2);
    assert_eq!(
        log.borrow().as_slice(),
        &["first:object_deleted", "second:object_deleted"]
    );
}

#[test]
fn publish_without_subscribers_is_a_no_op() {
    let notifier = ChangeNotifier::new();
    let report = notifier.publish(ChangeEvent::AllObjectsCleared);
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, 0);
}

#[test]
fn subscriber_added_mid_dispatch_waits_for_next_publish() {
    let notifier = Rc::new(ChangeNotifier::new());
    let log: Log = Rc::default();

    let weak = Rc::downgrade(&notifier);
    let late_log = Rc::clone(&log);
    notifier.subscribe(ChangeKind::AllObjectsCleared, move |_| {
        if let Some(notifier) = weak.upgrade() {
            notifier.subscribe(ChangeKind::AllObjectsCleared, recorder(&late_log, "late"));
        }
        Ok(())
    });

    notifier.publish(ChangeEvent::AllObjectsCleared);
    assert!(log.borrow().is_empty());
    assert_eq!(notifier.subscriber_count(ChangeKind::AllObjectsCleared), 2);

    notifier.publish(ChangeEvent::AllObjectsCleared);
    assert_eq!(log.borrow().as_slice(), &["late:all_objects_cleared"]);
}

#[test]
fn handler_may_publish_reentrantly_and_order_follows_publish_calls() {
    let notifier = Rc::new(ChangeNotifier::new());
    let log: Log = Rc::default();

    let weak = Rc::downgrade(&notifier);
    let outer_log = Rc::clone(&log);
    notifier.subscribe(ChangeKind::ObjectDeleted, move |event| {
        outer_log
            .borrow_mut()
            .push(format!("outer:{}", event.kind().as_str()));
        if let Some(notifier) = weak.upgrade() {
            notifier.publish(ChangeEvent::SelectionChanged(None));
        }
        Ok(())
    });
    notifier.subscribe(ChangeKind::SelectionChanged, recorder(&log, "inner"));
    notifier.subscribe(ChangeKind::ObjectDeleted, recorder(&log, "tail"));

    notifier.publish(ChangeEvent::ObjectDeleted(Uuid::new_v4()));

    assert_eq!(
        log.borrow().as_slice(),
        &[
            "outer:object_deleted",
            "inner:selection_changed",
            "tail:object_deleted"
        ]
    );
}

#[test]
fn unsubscribed_handler_stops_receiving() {
    let notifier = ChangeNotifier::new();
    let log: Log = Rc::default();
    let id = notifier.subscribe(ChangeKind::PanZoomChanged, recorder(&log, "gone"));

    assert!(notifier.unsubscribe(id));
    notifier.publish(ChangeEvent::PanZoomChanged(Default::default()));

    assert!(log.borrow().is_empty());
}

#[test]
fn missing_collaborator_does_not_block_other_subscribers() {
    let notifier = ChangeNotifier::new();
    let log: Log = Rc::default();
    notifier.subscribe(ChangeKind::SelectionChanged, |_| {
        Err(DispatchError::MissingCollaborator("inspector"))
    });
    notifier.subscribe(ChangeKind::SelectionChanged, recorder(&log, "canvas"));

    let report = notifier.publish(ChangeEvent::SelectionChanged(None));

    assert_eq!(report.failed, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(log.borrow().len(), 1);
}
