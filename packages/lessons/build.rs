use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("lessons.rs");

    let mut code = String::new();
    code.push_str("/// Embedded lesson files as (name, yaml)\n");
    code.push_str("pub static LESSONS: &[(&str, &str)] = &[\n");

    let lessons_dir = Path::new("data");

    if lessons_dir.exists() {
        for entry in WalkDir::new(lessons_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "yaml"))
        {
            let path = entry.path();
            // Lessons are addressed by file stem: data/do-re-mi.yaml -> "do-re-mi"
            let name = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            };

            if let Ok(content) = fs::read_to_string(path) {
                code.push_str(&format!("    ({:?}, {:?}),\n", name, content));
            }
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }

    code.push_str("];\n");

    fs::write(&dest_path, code).unwrap();

    println!("cargo:rerun-if-changed=data");
}
