use plexfield::Viewer;

fn main() {
    // No usable GPU or window just means no background effect.
    if let Err(err) = Viewer::new().run() {
        eprintln!("plexfield: {}", err);
        std::process::exit(1);
    }
}
