//! Test configuration form: sliders, test-kind radios and request building.

use crate::error::{DashboardError, UiError};
use crate::model::{BenchmarkRequest, TestKind};
use crate::ui::Ui;

pub const CPU_RADIO_ID: &str = "testTypeCPU";
pub const IO_RADIO_ID: &str = "testTypeIO";
pub const CPU_PANE_ID: &str = "cpuTestConfig";
pub const IO_PANE_ID: &str = "ioTestConfig";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    MatrixSize,
    ParallelTasks,
    FileSizeKb,
    IoParallelTasks,
}

impl Slider {
    pub const ALL: [Slider; 4] = [
        Slider::MatrixSize,
        Slider::ParallelTasks,
        Slider::FileSizeKb,
        Slider::IoParallelTasks,
    ];

    pub fn input_id(&self) -> &'static str {
        match self {
            Slider::MatrixSize => "matrixSize",
            Slider::ParallelTasks => "parallelTasks",
            Slider::FileSizeKb => "fileSizeKB",
            Slider::IoParallelTasks => "ioParallelTasks",
        }
    }

    pub fn label_id(&self) -> &'static str {
        match self {
            Slider::MatrixSize => "matrixSizeValue",
            Slider::ParallelTasks => "parallelTasksValue",
            Slider::FileSizeKb => "fileSizeKBValue",
            Slider::IoParallelTasks => "ioParallelTasksValue",
        }
    }

    pub fn format(&self, value: &str) -> String {
        match self {
            Slider::MatrixSize => format!("{} x {}", value, value),
            Slider::FileSizeKb => format!("{} KB", value),
            Slider::ParallelTasks | Slider::IoParallelTasks => value.to_string(),
        }
    }

    /// Mirror the slider's value into its label.
    pub fn sync_label(&self, ui: &mut dyn Ui) -> Result<(), UiError> {
        let value = ui.value(self.input_id())?.unwrap_or_default();
        ui.set_text(self.label_id(), &self.format(&value))
    }
}

/// Show the config pane for `kind` and hide the other.
pub fn show_pane(ui: &mut dyn Ui, kind: TestKind) -> Result<(), UiError> {
    ui.set_visible(CPU_PANE_ID, kind == TestKind::Cpu)?;
    ui.set_visible(IO_PANE_ID, kind == TestKind::Io)
}

/// Raw form selection, as read from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub kind: TestKind,
    pub matrix_size: Option<u32>,
    pub parallel_tasks: Option<u32>,
    pub file_size_kb: Option<u32>,
    pub io_parallel_tasks: Option<u32>,
}

impl FormState {
    pub fn read(ui: &dyn Ui) -> Result<Self, UiError> {
        let kind = if ui.is_checked(IO_RADIO_ID)? { TestKind::Io } else { TestKind::Cpu };
        let num = |slider: Slider| -> Result<Option<u32>, UiError> {
            Ok(ui.value(slider.input_id())?.and_then(|v| v.trim().parse().ok()))
        };
        Ok(Self {
            kind,
            matrix_size: num(Slider::MatrixSize)?,
            parallel_tasks: num(Slider::ParallelTasks)?,
            file_size_kb: num(Slider::FileSizeKb)?,
            io_parallel_tasks: num(Slider::IoParallelTasks)?,
        })
    }

    /// Only the parameters relevant to the selected kind are consulted.
    pub fn to_request(&self) -> Result<BenchmarkRequest, DashboardError> {
        let missing = |what: &str| DashboardError::InvalidRequest(format!("{} is not a number", what));
        match self.kind {
            TestKind::Cpu => BenchmarkRequest::cpu(
                self.matrix_size.ok_or_else(|| missing("matrix size"))?,
                self.parallel_tasks.ok_or_else(|| missing("parallel tasks"))?,
            ),
            TestKind::Io => BenchmarkRequest::io(
                self.file_size_kb.ok_or_else(|| missing("file size"))?,
                self.io_parallel_tasks.ok_or_else(|| missing("parallel tasks"))?,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_FILE_SIZE_KB, DEFAULT_MATRIX_SIZE};

    fn form(kind: TestKind) -> FormState {
        FormState {
            kind,
            matrix_size: Some(300),
            parallel_tasks: Some(6),
            file_size_kb: Some(2048),
            io_parallel_tasks: None,
        }
    }

    #[test]
    fn test_cpu_ignores_io_fields() {
        let req = form(TestKind::Cpu).to_request().unwrap();
        assert_eq!(req.matrix_size, 300);
        assert_eq!(req.parallel_tasks, 6);
        assert_eq!(req.file_size_kb, DEFAULT_FILE_SIZE_KB);
    }

    #[test]
    fn test_io_uses_io_task_count() {
        assert!(form(TestKind::Io).to_request().is_err());
        let mut f = form(TestKind::Io);
        f.io_parallel_tasks = Some(30);
        let req = f.to_request().unwrap();
        assert_eq!(req.parallel_tasks, 30);
        assert_eq!(req.file_size_kb, 2048);
        assert_eq!(req.matrix_size, DEFAULT_MATRIX_SIZE);
    }

    #[test]
    fn test_slider_format() {
        assert_eq!(Slider::MatrixSize.format("200"), "200 x 200");
        assert_eq!(Slider::FileSizeKb.format("64"), "64 KB");
        assert_eq!(Slider::IoParallelTasks.format("50"), "50");
    }
}
