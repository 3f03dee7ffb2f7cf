//! Export session: hide chrome, capture, restore.
//!
//! Chrome is hidden exactly while an export is in flight, so finishing a
//! job (on success or failure) is the only thing that shows it again and
//! a second `begin` cannot interleave its own hide/restore.

use mm_render::{Download, ExportError, ExportFrame, RasterImage};

/// A started export. Hand `frame` to an `ImageExporter` and pass the job
/// back to `MapEditor::finish_export` with the outcome.
#[must_use = "an unfinished export keeps the node controls hidden"]
#[derive(Debug)]
pub struct ExportJob {
    ticket: u64,
    pub frame: ExportFrame,
    pub filename: String,
}

impl ExportJob {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

#[derive(Debug, Default)]
pub struct ExportSession {
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl ExportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn chrome_visible(&self) -> bool {
        !self.in_flight()
    }

    /// Claim the session. `None` while another export is running.
    pub(crate) fn begin(&mut self, frame: ExportFrame, filename: String) -> Option<ExportJob> {
        if self.in_flight.is_some() {
            return None;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(ticket);
        Some(ExportJob {
            ticket,
            frame,
            filename,
        })
    }

    /// Release the session and turn the capture outcome into a download.
    pub(crate) fn finish(
        &mut self,
        job: ExportJob,
        outcome: Result<RasterImage, ExportError>,
    ) -> Result<Download, ExportError> {
        if self.in_flight == Some(job.ticket) {
            self.in_flight = None;
        } else {
            log::warn!("finishing stale export job {}", job.ticket);
        }
        match outcome {
            Ok(image) => {
                log::debug!(
                    "exported {}x{} image as {}",
                    image.width,
                    image.height,
                    job.filename
                );
                Ok(Download::png(&job.filename, &image.png))
            }
            Err(err) => {
                log::warn!("export failed: {err}");
                Err(err)
            }
        }
    }
}
