//! # 默认配置
//!
//! 未在配置文件和命令行中给出时使用的默认值，以及 `init` 写出的模板。

/// 目标应力 xx yy zz xy yz zx (kB)
pub const TARGET_STRESS: [f64; 6] = [120.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// 收敛阈值 (kB)
pub const THRESHOLD: f64 = 0.1;
/// 杨氏模量 (kB)
pub const YOUNG_MODULUS: f64 = 2790.0;
pub const POISSON_RATIO: f64 = 0.21;
pub const MAX_ITERATIONS: usize = 30;

pub const COMMAND: &str = "mpirun vasp_std";
pub const STDOUT: &str = "results.txt";
pub const SEED: &str = "poscar.0";
pub const REMOVE_ON_EXIT: &[&str] = &["WAVECAR"];

pub const STRUCTURE: &str = "POSCAR";
pub const RELAXED: &str = "CONTCAR";
pub const OUTCAR: &str = "OUTCAR";
pub const OSZICAR: &str = "OSZICAR";
pub const STRESS_LOG: &str = "pressure.all";
pub const ENERGY_LOG: &str = "oszicar.all";
pub const ARCHIVE_PREFIX: &str = "poscar";

pub const CONFIG_FILE: &str = "fixpress.toml";

/// 配置模板
pub const TEMPLATE: &str = r#"# fixpress configuration
#
# Set ISIF = 2 in INCAR: VASP relaxes the ions, fixpress adjusts the cell.
# Copy the starting POSCAR to the seed file (poscar.0) before the first run.

[target]
# Target stress tensor xx yy zz xy yz zx in kB (VASP convention: compressive is positive)
stress = [120.0, 0.0, 0.0, 0.0, 0.0, 0.0]
# Convergence criterion on max |target - measured| in kB
threshold = 0.1

[elastic]
# Estimated Young's modulus in kB
young-modulus = 2790.0
# Estimated Poisson ratio
poisson-ratio = 0.21

[run]
max-iterations = 30
# Shell command launching VASP in the working directory
command = "mpirun vasp_std"
# File receiving the command's stdout (set to "" to inherit the terminal)
stdout = "results.txt"
seed = "poscar.0"
# Files deleted once the loop terminates
remove-on-exit = ["WAVECAR"]

# [files]
# structure = "POSCAR"
# relaxed = "CONTCAR"
# outcar = "OUTCAR"
# oszicar = "OSZICAR"
# stress-log = "pressure.all"
# energy-log = "oszicar.all"
# archive-prefix = "poscar"

# [markers]
# completion = "Total CPU time used (sec):"
# stress = "in kB"
"#;
