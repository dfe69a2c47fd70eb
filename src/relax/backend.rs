//! # VASP 工作目录后端
//!
//! `SimulationBackend` 的 VASP 实现，负责控制器之外的全部文件与进程操作：
//! - 初始结构 `poscar.0` -> `POSCAR`
//! - 通过 `sh -c` 调用 VASP，阻塞直到结束（不依赖退出码）
//! - 从 `OUTCAR` 读取完成标记和应力
//! - 以 `CONTCAR`（离子弛豫后的坐标）为模板写出新晶格，并存档为 `poscar.<n>`
//! - 累积 `pressure.all` 和 `oszicar.all` 日志
//!
//! 工作目录在运行期间由本进程独占，不做并发写保护。
//!
//! ## 依赖关系
//! - 被 `commands/relax.rs` 使用
//! - 使用 `parsers/outcar.rs`, `parsers/poscar.rs`, `utils/progress.rs`

use super::controller::{AbortReason, RelaxReport, RelaxState, SimulationBackend};
use crate::config::{FileLayout, RelaxConfig, RunSettings};
use crate::error::{FixpressError, Result};
use crate::models::{LatticeMatrix, SimulationOutcome};
use crate::parsers::{outcar, poscar, Markers};
use crate::utils::{output, progress};

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 日志首行
pub const LOG_HEADER: &str = "starting calculation";

/// VASP 工作目录后端
pub struct VaspBackend {
    workdir: PathBuf,
    run: RunSettings,
    files: FileLayout,
    markers: Markers,
    resume: bool,
    show_progress: bool,
}

impl VaspBackend {
    pub fn new(workdir: impl Into<PathBuf>, config: &RelaxConfig) -> Self {
        VaspBackend {
            workdir: workdir.into(),
            run: config.run.clone(),
            files: config.files.clone(),
            markers: config.markers.clone(),
            resume: false,
            show_progress: true,
        }
    }

    /// 跳过初始模拟，直接使用已有的 OUTCAR
    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn path(&self, name: &str) -> PathBuf {
        self.workdir.join(name)
    }

    /// 运行模拟器并等待结束
    fn run_simulator(&self, label: &str) -> Result<()> {
        let command = &self.run.command;
        tracing::info!(%command, workdir = %self.workdir.display(), "launching simulator");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(&self.workdir);
        if let Some(ref stdout) = self.run.stdout {
            let path = self.path(stdout);
            let file = File::create(&path).map_err(|e| FixpressError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            cmd.stdout(Stdio::from(file));
        }

        let spinner = self
            .show_progress
            .then(|| progress::create_spinner(&format!("{}: {}", label, command)));

        let status = cmd.status().map_err(|e| FixpressError::CommandFailed {
            command: command.clone(),
            stderr: e.to_string(),
        });

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let status = status?;
        if !status.success() {
            // 完成与否只看 OUTCAR
            tracing::warn!(%command, ?status, "simulator exited with non-zero status");
        }

        self.append_file(&self.files.oszicar, &self.files.energy_log)
    }

    /// 将 `src` 的内容追加到 `dest`；`src` 不存在时跳过
    fn append_file(&self, src: &str, dest: &str) -> Result<()> {
        let src_path = self.path(src);
        let content = match fs::read(&src_path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %src_path.display(), "nothing to append");
                return Ok(());
            }
            Err(e) => {
                return Err(FixpressError::FileReadError {
                    path: src_path.display().to_string(),
                    source: e,
                })
            }
        };
        append_bytes(&self.path(dest), &content)
    }

    fn append_log_line(&self, line: &str) -> Result<()> {
        let mut text = line.trim_end().to_string();
        text.push('\n');
        append_bytes(&self.path(&self.files.stress_log), text.as_bytes())
    }

    /// 新结构的模板：优先 CONTCAR（非空），否则当前 POSCAR
    fn structure_template(&self) -> Result<String> {
        let relaxed = self.path(&self.files.relaxed);
        let usable = relaxed.metadata().map(|m| m.len() > 0).unwrap_or(false);
        let source = if usable {
            relaxed
        } else {
            tracing::debug!("no relaxed structure, using current structure as template");
            self.path(&self.files.structure)
        };
        poscar::read_structure_text(&source)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to).map(|_| ()).map_err(|e| FixpressError::FileWriteError {
            path: to.display().to_string(),
            source: e,
        })
    }

    fn cleanup(&self) {
        for name in &self.run.remove_on_exit {
            let path = self.path(name);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => output::print_warning(&format!(
                    "Failed to remove {}: {}",
                    path.display(),
                    e
                )),
            }
        }
    }
}

fn append_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FixpressError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
    file.write_all(bytes)
        .map_err(|e| FixpressError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
}

/// 终止状态在日志中的说明行
pub fn terminal_note(report: &RelaxReport) -> String {
    match report.state {
        RelaxState::Converged => format!("convergence reached at iteration {}", report.iteration),
        RelaxState::Aborted(AbortReason::Incomplete) => format!(
            "calculation aborted: run before iteration {} did not complete",
            report.iteration
        ),
        RelaxState::Exhausted => format!(
            "iteration budget of {} exhausted without convergence",
            report.max_iterations
        ),
        RelaxState::Running => "calculation interrupted".to_string(),
    }
}

impl SimulationBackend for VaspBackend {
    fn start(&mut self) -> Result<()> {
        if !self.workdir.is_dir() {
            return Err(FixpressError::DirectoryNotFound {
                path: self.workdir.display().to_string(),
            });
        }

        if self.resume {
            output::print_info("Resuming from existing simulator output");
            return self.append_log_line("resuming calculation");
        }

        let seed = self.path(&self.run.seed);
        if !seed.exists() {
            return Err(FixpressError::FileNotFound {
                path: seed.display().to_string(),
            });
        }
        self.copy(&seed, &self.path(&self.files.structure))?;

        let stress_log = self.path(&self.files.stress_log);
        fs::write(&stress_log, format!("{}\n", LOG_HEADER)).map_err(|e| {
            FixpressError::FileWriteError {
                path: stress_log.display().to_string(),
                source: e,
            }
        })?;
        // 能量日志每次运行重新开始
        let energy_log = self.path(&self.files.energy_log);
        if energy_log.exists() {
            fs::remove_file(&energy_log).map_err(|e| FixpressError::FileWriteError {
                path: energy_log.display().to_string(),
                source: e,
            })?;
        }

        self.run_simulator("initial run")
    }

    fn read_outcome(&mut self, iteration: usize) -> Result<SimulationOutcome> {
        let outcome = outcar::read_outcome(&self.path(&self.files.outcar), &self.markers)?;
        if let Some(ref line) = outcome.stress_line {
            self.append_log_line(line)?;
        }
        tracing::debug!(iteration, completed = outcome.completed, "outcome read");
        Ok(outcome)
    }

    fn submit(&mut self, lattice: &LatticeMatrix, iteration: usize) -> Result<()> {
        // 续算时保留上一次运行的存档
        let archive = self.path(&self.files.archive_name(iteration));
        if self.resume && archive.exists() {
            return Err(FixpressError::ArchiveExists {
                path: archive.display().to_string(),
            });
        }

        let template = self.structure_template()?;
        let structure = self.path(&self.files.structure);
        poscar::write_with_lattice(&template, lattice, &structure)?;

        self.copy(&structure, &archive)?;
        tracing::info!(iteration, archive = %archive.display(), "structure written");

        self.run_simulator(&format!("iteration {}", iteration))
    }

    fn finish(&mut self, report: &RelaxReport) -> Result<()> {
        self.append_log_line(&terminal_note(report))?;
        self.cleanup();
        Ok(())
    }
}
