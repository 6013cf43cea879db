//! 카탈로그 앱 실행기
//!
//! `settings.json`의 `catalogDir` 경로를 호스트를 방해하지 않고 실행합니다.
//! - 디렉터리: 셸로 열기
//! - `.exe`: 콘솔 없이 직접 실행, 실패하면 셸 연결 프로그램으로
//! - `.bat`/`.cmd`/`.ps1`: 해당 인터프리터로 숨겨서 실행
//! - 그 밖: 셸 연결 프로그램
//!
//! 실행 방식 결정(`plan_launch`)은 순수 함수이고, 실제 실행(`execute`)만 플랫폼별입니다.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::LaunchError;
use crate::extract::find_string;
use crate::store::CatalogStore;

/// settings.json에서 실행 경로를 담는 키
pub const TARGET_KEY: &str = "catalogDir";

/// 실행 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// 파일 탐색기로 열기
    OpenDirectory(PathBuf),
    /// 실행 파일 직접 실행 (실패 시 셸 연결로 폴백)
    Direct {
        program: PathBuf,
        work_dir: Option<PathBuf>,
    },
    /// 인터프리터로 숨겨서 실행. `command_line`은 프로그램 뒤에 그대로 붙습니다.
    Interpreter {
        program: PathBuf,
        command_line: String,
        work_dir: Option<PathBuf>,
    },
    /// 확장자 연결 프로그램
    ShellAssociation {
        target: PathBuf,
        work_dir: Option<PathBuf>,
    },
}

impl LaunchPlan {
    /// 사용자 메시지/로그용 대상 경로
    pub fn target(&self) -> &Path {
        match self {
            LaunchPlan::OpenDirectory(path) => path,
            LaunchPlan::Direct { program, .. } => program,
            LaunchPlan::Interpreter { program, .. } => program,
            LaunchPlan::ShellAssociation { target, .. } => target,
        }
    }
}

/// 앞뒤 공백을 자르고, 전체를 감싼 따옴표 한 쌍을 벗깁니다.
pub fn normalize_target(raw: &str) -> &str {
    let s = raw.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// 마지막 경로 구분자(`/` 또는 `\`) 앞부분
fn parent_dir(path: &str) -> Option<PathBuf> {
    let cut = path.rfind(is_separator)?;
    (cut > 0).then(|| PathBuf::from(&path[..cut]))
}

/// 마지막 구성요소의 확장자 (소문자, 점 제외)
fn extension(path: &str) -> Option<String> {
    let name = match path.rfind(is_separator) {
        Some(cut) => &path[cut + 1..],
        None => path,
    };
    let dot = name.rfind('.')?;
    Some(name[dot + 1..].to_ascii_lowercase())
}

/// 환경 변수를 조회해 실행 방식을 정합니다. 빈 경로면 `None`.
pub fn plan_launch(raw: &str) -> Option<LaunchPlan> {
    plan_launch_with(raw, |name| std::env::var(name).ok(), |p| p.is_dir())
}

/// `plan_launch`의 본체. 환경 조회와 디렉터리 판정을 주입받습니다.
pub fn plan_launch_with(
    raw: &str,
    env: impl Fn(&str) -> Option<String>,
    is_dir: impl Fn(&Path) -> bool,
) -> Option<LaunchPlan> {
    let path = normalize_target(raw);
    if path.is_empty() {
        return None;
    }
    if is_dir(Path::new(path)) {
        return Some(LaunchPlan::OpenDirectory(PathBuf::from(path)));
    }

    let work_dir = parent_dir(path);
    let plan = match extension(path).as_deref() {
        Some("exe") => LaunchPlan::Direct {
            program: PathBuf::from(path),
            work_dir,
        },
        Some("bat") | Some("cmd") => {
            let comspec = env("COMSPEC")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| r"C:\Windows\System32\cmd.exe".to_string());
            LaunchPlan::Interpreter {
                program: PathBuf::from(comspec),
                command_line: format!("/c \"{}\"", path),
                work_dir,
            }
        }
        Some("ps1") => {
            let root = env("SystemRoot")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| r"C:\Windows".to_string());
            LaunchPlan::Interpreter {
                program: PathBuf::from(format!(
                    r"{}\System32\WindowsPowerShell\v1.0\powershell.exe",
                    root.trim_end_matches('\\')
                )),
                command_line: format!(
                    "-NoProfile -ExecutionPolicy Bypass -WindowStyle Hidden -File \"{}\"",
                    path
                ),
                work_dir,
            }
        }
        _ => LaunchPlan::ShellAssociation {
            target: PathBuf::from(path),
            work_dir,
        },
    };
    Some(plan)
}

/// Windows에서 콘솔 창 없이 프로세스를 실행하는 헬퍼
#[cfg(target_os = "windows")]
fn no_window(cmd: &mut Command) -> &mut Command {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x08000000;
    cmd.creation_flags(CREATE_NO_WINDOW)
}

#[cfg(not(target_os = "windows"))]
fn no_window(cmd: &mut Command) -> &mut Command {
    cmd
}

#[cfg(target_os = "windows")]
fn append_command_line(cmd: &mut Command, line: &str) {
    use std::os::windows::process::CommandExt;
    cmd.raw_arg(line);
}

#[cfg(not(target_os = "windows"))]
fn append_command_line(cmd: &mut Command, line: &str) {
    cmd.args(line.split_whitespace());
}

/// 연결 프로그램으로 엽니다 (ShellExecute "open").
#[cfg(target_os = "windows")]
fn shell_open(target: &Path, work_dir: Option<&Path>) -> bool {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use std::ptr::null_mut;
    use winapi::um::shellapi::ShellExecuteW;
    use winapi::um::winuser::SW_SHOWNORMAL;

    fn wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let verb = wide(OsStr::new("open"));
    let file = wide(target.as_os_str());
    let dir = work_dir.map(|d| wide(d.as_os_str()));
    let dir_ptr = dir.as_ref().map_or(std::ptr::null(), |d| d.as_ptr());

    // 반환값이 32보다 크면 성공
    let result = unsafe {
        ShellExecuteW(
            null_mut(),
            verb.as_ptr(),
            file.as_ptr(),
            std::ptr::null(),
            dir_ptr,
            SW_SHOWNORMAL,
        )
    };
    result as isize > 32
}

#[cfg(not(target_os = "windows"))]
fn shell_open(target: &Path, work_dir: Option<&Path>) -> bool {
    let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
    let mut cmd = Command::new(opener);
    cmd.arg(target);
    if let Some(dir) = work_dir.filter(|d| d.is_dir()) {
        cmd.current_dir(dir);
    }
    cmd.spawn().is_ok()
}

fn spawn_detached(program: &Path, command_line: Option<&str>, work_dir: Option<&Path>) -> std::io::Result<()> {
    let mut cmd = Command::new(program);
    if let Some(line) = command_line {
        append_command_line(&mut cmd, line);
    }
    if let Some(dir) = work_dir {
        cmd.current_dir(dir);
    }
    no_window(&mut cmd);
    // 자식 핸들은 바로 버림 (기다리지 않음)
    cmd.spawn().map(drop)
}

/// 계획대로 실행합니다.
pub fn execute(plan: &LaunchPlan) -> Result<(), LaunchError> {
    let ok = match plan {
        LaunchPlan::OpenDirectory(path) => shell_open(path, None),
        LaunchPlan::Direct { program, work_dir } => {
            match spawn_detached(program, None, work_dir.as_deref()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "[Launch] Direct start of '{}' failed ({}), trying shell association",
                        program.display(),
                        e
                    );
                    shell_open(program, work_dir.as_deref())
                }
            }
        }
        LaunchPlan::Interpreter {
            program,
            command_line,
            work_dir,
        } => match spawn_detached(program, Some(command_line), work_dir.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[Launch] '{}' could not be started: {}", program.display(), e);
                false
            }
        },
        LaunchPlan::ShellAssociation { target, work_dir } => shell_open(target, work_dir.as_deref()),
    };

    if ok {
        tracing::info!("[Launch] Started {:?}", plan);
        Ok(())
    } else {
        Err(LaunchError::LaunchFailed {
            path: plan.target().display().to_string(),
        })
    }
}

/// 원시 경로 문자열을 실행합니다.
pub fn launch(raw: &str) -> Result<(), LaunchError> {
    match plan_launch(raw) {
        Some(plan) => execute(&plan),
        None => Err(LaunchError::LaunchFailed { path: raw.to_string() }),
    }
}

/// settings.json에서 `catalogDir` 값을 읽습니다.
pub fn read_launch_target(store: &CatalogStore) -> Result<String, LaunchError> {
    let settings = store.read_settings().map_err(LaunchError::SettingsMissing)?;
    let target = find_string(&settings, TARGET_KEY).ok_or(LaunchError::TargetMissing)?;
    Ok(target.trim().to_string())
}

/// 설정된 카탈로그 앱을 실행합니다.
pub fn launch_catalog(store: &CatalogStore) -> Result<(), LaunchError> {
    let target = read_launch_target(store)?;
    launch(&target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn plan(raw: &str) -> LaunchPlan {
        plan_launch_with(raw, no_env, |_| false).unwrap()
    }

    #[test]
    fn target_is_trimmed_and_unquoted() {
        assert_eq!(normalize_target("  \"C:\\Apps\\catalog.exe\"\r\n"), "C:\\Apps\\catalog.exe");
        assert_eq!(normalize_target("plain"), "plain");
        assert_eq!(normalize_target("\""), "\"");
        assert!(plan_launch_with("  \"\" ", no_env, |_| false).is_none());
    }

    #[test]
    fn executable_is_started_directly_in_its_directory() {
        assert_eq!(
            plan(r"C:\Apps\Catalog\Catalog.EXE"),
            LaunchPlan::Direct {
                program: PathBuf::from(r"C:\Apps\Catalog\Catalog.EXE"),
                work_dir: Some(PathBuf::from(r"C:\Apps\Catalog")),
            }
        );
    }

    #[test]
    fn scripts_use_their_interpreter() {
        let bat = plan_launch_with(
            r"D:\tools\run.cmd",
            |name| (name == "COMSPEC").then(|| r"C:\Win\cmd.exe".to_string()),
            |_| false,
        )
        .unwrap();
        assert_eq!(
            bat,
            LaunchPlan::Interpreter {
                program: PathBuf::from(r"C:\Win\cmd.exe"),
                command_line: r#"/c "D:\tools\run.cmd""#.to_string(),
                work_dir: Some(PathBuf::from(r"D:\tools")),
            }
        );

        match plan(r"D:\tools\run.ps1") {
            LaunchPlan::Interpreter { program, command_line, .. } => {
                assert_eq!(
                    program,
                    PathBuf::from(r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe")
                );
                assert_eq!(
                    command_line,
                    r#"-NoProfile -ExecutionPolicy Bypass -WindowStyle Hidden -File "D:\tools\run.ps1""#
                );
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn unknown_extension_uses_shell_association() {
        assert_eq!(
            plan("catalog.lnk"),
            LaunchPlan::ShellAssociation {
                target: PathBuf::from("catalog.lnk"),
                work_dir: None,
            }
        );
        // 디렉터리 이름의 점은 확장자가 아님
        assert!(matches!(
            plan(r"C:\v1.exe\catalog"),
            LaunchPlan::ShellAssociation { .. }
        ));
    }

    #[test]
    fn directory_is_opened() {
        let dir = TempDir::new().unwrap();
        let raw = format!("\"{}\"", dir.path().display());
        assert_eq!(
            plan_launch(&raw),
            Some(LaunchPlan::OpenDirectory(dir.path().to_path_buf()))
        );
    }

    #[test]
    fn settings_lookup_reports_distinct_codes() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path(), 1024);

        let err = read_launch_target(&store).unwrap_err();
        assert_eq!(err.code(), 1);

        store
            .write_all(&store.settings_path(), br#"{"theme":"dark"}"#)
            .unwrap();
        assert_eq!(read_launch_target(&store).unwrap_err().code(), 2);

        store
            .write_all(
                &store.settings_path(),
                br#"{"catalogDir": "  C:\\Apps\\catalog.exe "}"#,
            )
            .unwrap();
        assert_eq!(read_launch_target(&store).unwrap(), r"C:\Apps\catalog.exe");
    }

    #[test]
    fn empty_target_fails_with_code_3() {
        let err = launch("   ").unwrap_err();
        assert_eq!(err.code(), 3);
    }
}
