//! Adds `<WindowsPackageType>None</WindowsPackageType>` to property groups.

use std::path::Path;

use super::descriptor::{Element, ProjectDescriptor, PROJECT_TAG};
use crate::config::UnpackConfig;
use crate::error::Result;

/// Configuration group tag inside `<Project>`
pub const PROPERTY_GROUP_TAG: &str = "PropertyGroup";

/// Flag element that switches MSIX packaging off
pub const PACKAGE_TYPE_TAG: &str = "WindowsPackageType";

/// Value written into newly created flag elements
pub const PACKAGE_TYPE_VALUE: &str = "None";

/// Result of editing a project file on disk
#[derive(Debug, Clone)]
pub struct ProjectEdit {
    /// The descriptor as written back to disk
    pub descriptor: ProjectDescriptor,
    /// Number of property groups that received a new flag element
    pub groups_updated: usize,
}

/// Property groups directly under the root, in document order.
pub fn property_groups(descriptor: &ProjectDescriptor) -> impl Iterator<Item = &Element> {
    descriptor.root.children_named(PROPERTY_GROUP_TAG)
}

/// Append the flag element to every property group lacking one.
///
/// Groups that already carry a `WindowsPackageType` child are left alone,
/// whatever its value. Returns how many groups were changed.
pub fn ensure_package_type(descriptor: &mut ProjectDescriptor) -> usize {
    let mut added = 0;
    for group in descriptor
        .root
        .child_elements_mut()
        .filter(|e| e.name == PROPERTY_GROUP_TAG)
    {
        if group.child(PACKAGE_TYPE_TAG).is_none() {
            group.push_child(Element::with_text(PACKAGE_TYPE_TAG, PACKAGE_TYPE_VALUE));
            added += 1;
        }
    }
    added
}

/// Load `path`, add the flag element where missing and save it in place.
pub fn edit_project_file<P: AsRef<Path>>(path: P, config: &UnpackConfig) -> Result<ProjectEdit> {
    let path = path.as_ref();
    let mut descriptor = ProjectDescriptor::load(path)?;
    descriptor.require_root(PROJECT_TAG, path)?;

    let groups_updated = ensure_package_type(&mut descriptor);
    tracing::debug!(
        "Added {} to {} property group(s) in {}",
        PACKAGE_TYPE_TAG,
        groups_updated,
        path.display()
    );

    descriptor.save(path, config.indent)?;
    tracing::info!("Updated project file {}", path.display());

    Ok(ProjectEdit {
        descriptor,
        groups_updated,
    })
}
