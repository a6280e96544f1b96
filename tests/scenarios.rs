//! End-to-end scenarios: components built with the public API, mounted into
//! the in-memory document.

use std::cell::RefCell;
use std::rc::Rc;

use spark_dom::prelude::*;
use spark_dom::{Error, MarkerKind, SubscriptionState, reset_config, set_marker_kind};

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> Log {
    dom::reset();
    reset_config();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Rc::new(RefCell::new(Vec::new()))
}

fn body_html() -> String {
    dom::inner_html(dom::body()).unwrap()
}

/// Register mount and unmount hooks that log `name`.
fn track(scope: &Html, log: &Log, name: &str) {
    let on_mount = log.clone();
    let mount_name = format!("mount {name}");
    scope.on_mount(move || on_mount.borrow_mut().push(mount_name.clone()));
    let on_unmount = log.clone();
    let unmount_name = format!("unmount {name}");
    scope.on_unmount(move || on_unmount.borrow_mut().push(unmount_name.clone()));
}

// =============================================================================
// Signals
// =============================================================================

#[test]
fn test_latest_subscriber_sees_current_value() {
    setup();
    let value = signal(1);
    value.set(2);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let subscription = value.subscribe(move |n| seen_clone.borrow_mut().push(*n));
    assert_eq!(*seen.borrow(), vec![2]);

    for n in 0..5 {
        value.set(n);
    }
    assert_eq!(seen.borrow().len(), 6);

    subscription.pause();
    value.set(100);
    subscription.resume();
    assert_eq!(subscription.state(), SubscriptionState::Active);
    assert_eq!(seen.borrow().last(), Some(&4), "no replay on resume");
}

// =============================================================================
// When
// =============================================================================

#[test]
fn test_when_mounts_and_unmounts_branch() {
    let log = setup();
    let condition = signal(false);

    let condition_clone = condition.clone();
    let log_clone = log.clone();
    let _handle = mount_to_body(move |scope| {
        when(scope, &condition_clone, None::<fn(&Html)>, |scope| {
            track(scope, &log_clone, "branch");
            tag(scope, "span", Attributes::new(), |scope| {
                text(scope, "Hello");
            });
        });
    });
    assert!(!body_html().contains("Hello"));

    condition.set(true);
    assert!(body_html().contains("<span>Hello</span>"));
    assert_eq!(*log.borrow(), vec!["mount branch"]);

    condition.set(false);
    condition.set(false);
    assert!(!body_html().contains("Hello"));
    assert_eq!(*log.borrow(), vec!["mount branch", "unmount branch"]);
}

// =============================================================================
// For
// =============================================================================

#[test]
fn test_each_insert_keeps_existing_items() {
    let log = setup();
    let items = reactive_list(["a", "b"]);

    let items_clone = items.clone();
    let log_clone = log.clone();
    let _handle = mount_to_body(move |scope| {
        tag(scope, "ul", Attributes::new(), |scope| {
            let log = log_clone.clone();
            each(scope, &items_clone, move |scope, item| {
                track(scope, &log, item);
                tag(scope, "li", Attributes::new(), |scope| {
                    text(scope, *item);
                });
            });
        });
    });
    assert_eq!(body_html(), "<ul><li>a</li><li>b</li></ul>");

    items.insert_at(1, "c");
    assert_eq!(body_html(), "<ul><li>a</li><li>c</li><li>b</li></ul>");
    assert_eq!(*log.borrow(), vec!["mount a", "mount b", "mount c"]);

    items.remove_at(0);
    assert_eq!(body_html(), "<ul><li>c</li><li>b</li></ul>");
    assert_eq!(log.borrow().last().map(String::as_str), Some("unmount a"));
}

#[test]
fn test_each_inside_dynamic() {
    setup();
    let grouped = signal(true);
    let items = reactive_list([1, 2]);

    let grouped_clone = grouped.clone();
    let items_clone = items.clone();
    let _handle = mount_to_body(move |scope| {
        dynamic(scope, &grouped_clone, move |scope, grouped| {
            let name = if *grouped { "ol" } else { "ul" };
            let items = items_clone.clone();
            tag(scope, name, Attributes::new(), move |scope| {
                each(scope, &items, |scope, n| {
                    text(scope, n.to_string());
                });
            });
        });
    });
    assert_eq!(body_html(), "<ol>12</ol>");

    grouped.set(false);
    items.push(3);
    assert_eq!(body_html(), "<ul>123</ul>");
    assert_eq!(items.mirror_count(), 1, "the old list's mirror is paused");
}

// =============================================================================
// Contexts
// =============================================================================

#[test]
fn test_nested_provide_shadows_for_inner_body_only() {
    setup();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_clone = seen.clone();
    let _handle = mount_to_body(move |scope| {
        scope.provide(vec![1, 2, 3], |outer| {
            outer.provide(vec![3, 2, 1], |inner| {
                let value = inner.context::<Vec<i32>>().unwrap();
                seen_clone.borrow_mut().push((*value).clone());
            });
            let value = outer.context::<Vec<i32>>().unwrap();
            seen_clone.borrow_mut().push((*value).clone());
        });
    });

    assert_eq!(*seen.borrow(), vec![vec![3, 2, 1], vec![1, 2, 3]]);
}

#[test]
fn test_missing_context_is_recoverable() {
    setup();
    let result = Rc::new(RefCell::new(None));

    let result_clone = result.clone();
    let _handle = mount_to_body(move |scope| {
        *result_clone.borrow_mut() = Some(scope.context_or::<Vec<i32>>("Some message"));
    });

    let result = result.borrow_mut().take().unwrap();
    match result {
        Err(Error::MissingContext { message, .. }) => assert_eq!(message, "Some message"),
        other => panic!("expected a missing context error, got {other:?}"),
    }
}

#[test]
fn test_context_reaches_dynamic_children() {
    setup();
    let theme = signal(0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let theme_clone = theme.clone();
    let seen_clone = seen.clone();
    let _handle = mount_to_body(move |scope| {
        scope.provide("dark", move |scope| {
            dynamic(scope, &theme_clone, move |scope, _| {
                let value = scope.context::<&str>().map(|theme| *theme);
                seen_clone.borrow_mut().push(value);
            });
        });
    });
    theme.set(1);

    assert_eq!(*seen.borrow(), vec![Ok("dark"), Ok("dark")]);
}

// =============================================================================
// Portal
// =============================================================================

#[test]
fn test_modal_portal() {
    let log = setup();
    let overlay = dom::create_element("div");
    dom::set_attribute(overlay, "id", Some("overlay"));
    dom::append_child(dom::body(), overlay);
    let open = signal(false);

    let open_clone = open.clone();
    let log_clone = log.clone();
    let handle = mount_to_body(move |scope| {
        tag(scope, "main", Attributes::new(), |scope| {
            when(scope, &open_clone, None::<fn(&Html)>, |scope| {
                portal(scope, overlay, |scope| {
                    track(scope, &log_clone, "modal");
                    tag(scope, "dialog", Attributes::new().value("open", ""), |scope| {
                        text(scope, "Hi");
                    });
                });
            });
        });
    });
    assert_eq!(dom::inner_html(overlay).unwrap(), "");

    open.set(true);
    assert_eq!(dom::inner_html(overlay).unwrap(), "<dialog open>Hi</dialog>");
    assert!(!dom::inner_html(dom::body()).unwrap().contains("<main><dialog"));

    handle.unmount();
    assert_eq!(dom::inner_html(overlay).unwrap(), "");
    assert_eq!(*log.borrow(), vec!["mount modal", "unmount modal"]);
}

// =============================================================================
// Markers and events
// =============================================================================

#[test]
fn test_comment_markers_are_visible() {
    setup();
    set_marker_kind(MarkerKind::Comment);

    let _handle = mount_to_body(|scope| {
        text(scope, "x");
    });
    assert_eq!(body_html(), "x<!---->");
}

#[test]
fn test_click_counter() {
    setup();
    let count = signal(0);
    let mut button = None;

    let count_clone = count.clone();
    let _handle = mount_to_body(|scope| {
        let increment = count_clone.clone();
        button = Some(tag(
            scope,
            "button",
            Attributes::new().on("click", move |_| increment.update(|n| *n += 1)),
            |scope| {
                text(scope, "Clicked ");
                dynamic_text(scope, &count_clone);
            },
        ));
    });
    let button = button.unwrap();

    for _ in 0..3 {
        dom::dispatch(button, "click");
    }
    assert_eq!(body_html(), "<button>Clicked 3</button>");
}
