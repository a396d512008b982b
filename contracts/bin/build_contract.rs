fn main() {
    odra_build::runtime();
}
