use std::env;
use std::path::Path;
use std::process::Command;

fn main() {
    // Исходник зонда встраивается в бинарник через include_str!
    println!("cargo:rerun-if-changed=probe/clinfo_probe.c");
    println!("cargo:rerun-if-env-changed=CC");

    let probe_path = Path::new("probe/clinfo_probe.c");
    if !probe_path.exists() {
        println!("cargo:warning=Не найден {}", probe_path.display());
    }

    // Ищем C-компилятор, которым зонд будет собираться во время работы
    let mut candidates = Vec::new();
    if let Ok(cc) = env::var("CC") {
        if !cc.trim().is_empty() {
            candidates.push(cc);
        }
    }
    candidates.extend(["gcc", "cc", "clang"].iter().map(|s| s.to_string()));

    for compiler in &candidates {
        let output = Command::new(compiler).arg("--version").output();

        match output {
            Ok(output) if output.status.success() => {
                println!("cargo:rustc-env=CL_ADVISOR_BUILD_CC={}", compiler);
                return;
            }
            Ok(_) => {
                println!(
                    "cargo:warning=Компилятор {} найден, но --version завершился с ошибкой",
                    compiler
                );
            }
            Err(_) => {}
        }
    }

    println!(
        "cargo:warning=C-компилятор не найден, генерация снимка потребует указать compiler в настройках"
    );
}
