use crate::kernel::git::GitStatusKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs `git status` for `folder`. A folder outside any repository yields
/// an empty list.
pub async fn git_status(folder: &Path) -> Result<Vec<(PathBuf, GitStatusKind)>, String> {
    let toplevel = Command::new("git")
        .arg("-C")
        .arg(folder)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .await
        .map_err(|e| e.to_string())?;
    if !toplevel.status.success() {
        return Ok(Vec::new());
    }

    let repo_root = PathBuf::from(String::from_utf8_lossy(&toplevel.stdout).trim());
    let repo_root = tokio::fs::canonicalize(&repo_root)
        .await
        .unwrap_or(repo_root);

    let output = Command::new("git")
        .arg("-C")
        .arg(folder)
        .args(["status", "--porcelain", "-z", "--untracked-files=all"])
        .output()
        .await
        .map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }

    Ok(parse_status_porcelain_z(&output.stdout, &repo_root))
}

pub fn parse_status_porcelain_z(data: &[u8], repo_root: &Path) -> Vec<(PathBuf, GitStatusKind)> {
    let mut out = Vec::new();
    let mut tokens = data.split(|b| *b == 0).filter(|t| !t.is_empty());
    while let Some(token) = tokens.next() {
        if token.len() < 4 {
            continue;
        }

        let x = token[0] as char;
        let y = token[1] as char;
        if x == '!' && y == '!' {
            continue;
        }
        if x == ' ' && y == ' ' {
            continue;
        }
        if token[2] != b' ' {
            continue;
        }

        let path = PathBuf::from(String::from_utf8_lossy(&token[3..]).to_string());

        // Renames and copies carry the original path as the next token.
        if x == 'R' || x == 'C' {
            let _ = tokens.next();
        }

        out.push((repo_root.join(path), status_from_xy(x, y)));
    }
    out
}

fn status_from_xy(x: char, y: char) -> GitStatusKind {
    if x == 'R' || y == 'R' {
        return GitStatusKind::Renamed;
    }
    let ch = if y != ' ' { y } else { x };
    match ch {
        'M' => GitStatusKind::Modified,
        'A' | '?' => GitStatusKind::Added,
        'D' => GitStatusKind::Deleted,
        _ => GitStatusKind::Changed,
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/git.rs"]
mod tests;
