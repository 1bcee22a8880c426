//! Page Impact Mapper

use repowiki_domain::{DiffResult, ImpactReport, WikiPage};

/// Map a diff onto the pages of the base version.
///
/// A page is impacted when one of its dependencies was added, removed or
/// modified. An impacted page whose every dependency was removed is also
/// orphaned. Pages without dependencies are never impacted by a diff; they
/// are listed as untracked. Without base pages the report marks a first run
/// and lists nothing.
pub fn map_impact(diff: &DiffResult, base_pages: Option<&[WikiPage]>) -> ImpactReport {
    let mut report = ImpactReport {
        diff: diff.clone(),
        ..ImpactReport::default()
    };

    let Some(pages) = base_pages else {
        report.first_run = true;
        return report;
    };

    let changed = diff.changed();
    for page in pages {
        if page.dependencies.is_empty() {
            report.untracked.push(page.id.clone());
            continue;
        }
        if !page.depends_on_any(&changed) {
            continue;
        }
        report.impacted.push(page.id.clone());
        if page
            .dependencies
            .iter()
            .all(|dep| diff.removed.contains(dep))
        {
            report.orphaned.push(page.id.clone());
        }
    }

    report
}
