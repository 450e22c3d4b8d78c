//! Plain-text report for terminals and logs.

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Human-readable listing of duplicate groups.
#[derive(Debug)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a text report over borrowed results.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (index, group) in self.groups.iter().enumerate() {
            writeln!(
                writer,
                "Group {} - {} x {} ({} reclaimable)",
                index + 1,
                group.len(),
                ByteSize::b(group.size),
                ByteSize::b(group.wasted_space())
            )?;
            for file in &group.files {
                writeln!(writer, "  {}", file.path.display())?;
            }
            writeln!(writer)?;
        }

        let s = self.summary;
        writeln!(
            writer,
            "Scanned {} file(s) ({}) in {:.2?}",
            s.total_files,
            s.total_size_display(),
            s.scan_duration
        )?;
        if s.invalid_roots > 0 {
            writeln!(writer, "Skipped {} invalid root(s)", s.invalid_roots)?;
        }
        if s.hardlinks_collapsed > 0 {
            writeln!(writer, "Ignored {} hard link(s)", s.hardlinks_collapsed)?;
        }
        if self.groups.is_empty() {
            writeln!(writer, "No duplicates found")
        } else {
            writeln!(
                writer,
                "Found {} duplicate group(s), {} redundant file(s), {} reclaimable ({:.1}%)",
                s.duplicate_groups,
                s.duplicate_files,
                s.reclaimable_display(),
                s.wasted_percentage()
            )
        }
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
