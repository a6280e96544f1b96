//! Portal - Render into a platform node outside the current tree.
//!
//! The contents belong to the portal's scope (contexts, lifecycle) but
//! their platform nodes live under `target`:
//!
//! ```text
//! <body>                          Html tree
//!   <main>…portal marker…</main>  mount content ─ portal fragment
//!   <div id="overlay">                              (mounts contents
//!     …contents…                                     into overlay)
//!   </div>
//! </body>
//! ```

use crate::engine::Html;
use crate::types::NodeId;

/// Build `children` now; attach them to `target` whenever the portal is
/// mounted and detach them whenever it is unmounted.
pub fn portal(scope: &Html, target: NodeId, children: impl FnOnce(&Html)) {
    let anchor = scope.new_fragment();
    let contents = scope.new_fragment();
    children(&contents);

    let target = Html::tag(target, scope.contexts().clone());

    let mount_target = target.clone();
    let mount_contents = contents.clone();
    anchor.on_mount(move || {
        mount_target.mount();
        mount_target.emit(mount_contents.clone());
    });

    anchor.on_unmount(move || {
        contents.remove_from_parent();
        target.unmount();
    });

    scope.emit(anchor);
}
