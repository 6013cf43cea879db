//! 매니페스트 필드 추출기
//!
//! 카탈로그 문서에서 필요한 몇 개의 문자열 필드만 뽑아내는 좁은 스캐너입니다.
//! 범용 JSON 파서가 아닙니다. 값은 평평한 문자열이라고 가정하며
//! 중첩 객체, 배열, 숫자/불리언 값은 다루지 않습니다.
//!
//! 이스케이프는 `\"`, `\\`, `\/` 만 해석하고 나머지(`\n` 등)는
//! 백슬래시 뒤의 문자를 그대로 씁니다.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// 원격 카탈로그의 패키지 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub latest_version: String,
}

/// 필터 스캔 결과
#[derive(Debug, Clone, Default)]
pub struct CatalogScan {
    /// 문서 순서대로 찾은 항목 (같은 id가 다시 나오면 뒤의 값으로 덮어씀)
    pub entries: Vec<CatalogEntry>,
    /// 요청한 id를 모두 찾아서 조기 종료했는지
    pub complete: bool,
    /// 스캔을 멈춘 바이트 위치
    pub scanned_to: usize,
}

impl CatalogScan {
    /// id → 최신 버전 맵으로 변환
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
            .into_iter()
            .map(|e| (e.id, e.latest_version))
            .collect()
    }
}

const ID_TOKEN: &[u8] = b"\"id\"";
const LATEST_TOKEN: &[u8] = b"\"latest-version\"";

/// `"<key>" : "<value>"` 형태의 첫 번째 유효한 값을 찾습니다.
///
/// 키 뒤가 문자열 값이 아니면 그 위치는 건너뛰고 다음 출현을 봅니다.
pub fn find_string(text: &[u8], key: &str) -> Option<String> {
    let token = format!("\"{}\"", key);
    let token = token.as_bytes();
    let mut pos = 0;
    while let Some(at) = find_bytes(text, token, pos) {
        let after = at + token.len();
        if let Some((value, _)) = value_after_key(text, after) {
            return Some(value);
        }
        pos = after;
    }
    None
}

/// installed.json (`{ "id": "version", ... }`)을 읽습니다.
///
/// 문자열 값이 아닌 쌍은 건너뜁니다. 같은 id가 여러 번 나오면 마지막 값이 남습니다.
pub fn parse_installed(text: &[u8]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut pos = 0;
    while let Some(q) = find_byte(text, b'"', pos) {
        let Some((key, key_end)) = read_string(text, q) else {
            break;
        };
        pos = key_end;

        let colon = skip_ws(text, key_end);
        if text.get(colon) != Some(&b':') {
            continue;
        }
        let value_start = skip_ws(text, colon + 1);
        if text.get(value_start) != Some(&b'"') {
            pos = value_start;
            continue;
        }
        match read_string(text, value_start) {
            Some((value, value_end)) => {
                map.insert(key, value);
                pos = value_end;
            }
            None => break,
        }
    }
    map
}

/// index.json에서 `"id"`를 가진 객체마다 `latest-version`을 뽑습니다.
///
/// `wanted`가 주어지면 해당 id만 수집하고, 모두 찾으면 즉시 멈춥니다.
/// 빈 집합이면 아무것도 읽지 않습니다. 잘못된 조각은 건너뛰고 계속 진행합니다.
pub fn scan_catalog(doc: &[u8], wanted: Option<&BTreeSet<String>>) -> CatalogScan {
    let mut scan = CatalogScan::default();
    if matches!(wanted, Some(w) if w.is_empty()) {
        scan.complete = true;
        return scan;
    }

    let mut resolved: HashSet<String> = HashSet::new();
    let mut pos = 0;
    // 직전 객체가 끝난 위치. 현재 객체의 여는 괄호는 이 뒤에서 찾는다.
    let mut prev_end = 0;

    while let Some(id_at) = find_bytes(doc, ID_TOKEN, pos) {
        let after_token = id_at + ID_TOKEN.len();
        let Some((id, id_end)) = value_after_key(doc, after_token) else {
            pos = after_token;
            continue;
        };
        let Some(obj_close) = find_byte(doc, b'}', id_end) else {
            pos = after_token;
            continue;
        };
        let obj_open = rfind_byte(&doc[prev_end..id_at], b'{')
            .map(|i| prev_end + i)
            .unwrap_or(id_at);

        pos = obj_close + 1;
        prev_end = pos;

        if let Some(w) = wanted {
            if !w.contains(&id) {
                continue;
            }
        }

        let body = &doc[..obj_close];
        let latest = find_bytes(body, LATEST_TOKEN, obj_open)
            .and_then(|lv| value_after_key(body, lv + LATEST_TOKEN.len()));
        let Some((latest_version, _)) = latest else {
            continue;
        };

        match scan.entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => existing.latest_version = latest_version,
            None => scan.entries.push(CatalogEntry {
                id: id.clone(),
                latest_version,
            }),
        }
        resolved.insert(id);

        if let Some(w) = wanted {
            if resolved.len() >= w.len() {
                scan.complete = true;
                break;
            }
        }
    }

    scan.scanned_to = pos.min(doc.len());
    scan
}

// ══════════════════════════════════════════════════════
// 바이트 스캔 헬퍼
// ══════════════════════════════════════════════════════

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0c)
}

fn skip_ws(text: &[u8], mut i: usize) -> usize {
    while i < text.len() && is_space(text[i]) {
        i += 1;
    }
    i
}

fn find_byte(text: &[u8], needle: u8, from: usize) -> Option<usize> {
    text.get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn rfind_byte(text: &[u8], needle: u8) -> Option<usize> {
    text.iter().rposition(|&b| b == needle)
}

fn find_bytes(text: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= text.len() {
        return None;
    }
    text[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// 키 토큰 바로 뒤에서 `: "<value>"`를 읽습니다. 반환값은 (값, 닫는 따옴표 다음 위치).
fn value_after_key(text: &[u8], after_key: usize) -> Option<(String, usize)> {
    let colon = skip_ws(text, after_key);
    if text.get(colon) != Some(&b':') {
        return None;
    }
    let start = skip_ws(text, colon + 1);
    if text.get(start) != Some(&b'"') {
        return None;
    }
    read_string(text, start)
}

/// `text[start]`의 따옴표부터 문자열 하나를 읽습니다. 닫히지 않으면 None.
fn read_string(text: &[u8], start: usize) -> Option<(String, usize)> {
    debug_assert_eq!(text.get(start), Some(&b'"'));
    let mut acc = Vec::new();
    let mut i = start + 1;
    while i < text.len() {
        let ch = text[i];
        i += 1;
        match ch {
            b'\\' => {
                let esc = *text.get(i)?;
                i += 1;
                // \" \\ \/ 포함, 나머지도 문자 그대로
                acc.push(esc);
            }
            b'"' => {
                let value = String::from_utf8(acc)
                    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
                return Some((value, i));
            }
            other => acc.push(other),
        }
    }
    None
}
