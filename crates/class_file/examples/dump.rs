use std::{env, fs::File, io::BufReader};

use roast_class_file::{AttributeInfo, Attributes, ClassFile};

fn main() {
    pretty_env_logger::init();

    let path = env::args().nth(1).expect("usage: dump <path to .class file>");
    let file = File::open(&path).unwrap();

    let class_file = match ClassFile::parse(BufReader::new(file)) {
        Ok(class_file) => class_file,
        Err(e) => {
            log::error!("{}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("Class:          {}", class_file.class_name().unwrap());
    println!(
        "Super Class:    {}",
        class_file.super_class().unwrap().unwrap_or("-")
    );
    println!("Major Version:  {}", class_file.major_version);
    println!("Minor Version:  {}", class_file.minor_version);
    println!("Access Flags:   {:?}", class_file.access_flags);
    println!();

    println!("Constant Pool:");
    for (index, cp_info) in class_file.constant_pool.iter() {
        println!("  #{:<4} {:?}", index, cp_info);
    }
    println!();

    println!("Interfaces:");
    for name in class_file.interface_names().unwrap() {
        println!("  {}", name);
    }
    println!();

    println!("Fields:");
    for field in &class_file.fields {
        println!(
            "  {} {} {:?}",
            class_file.field_name(field).unwrap(),
            class_file.field_descriptor(field).unwrap(),
            field.access_flags
        );
        print_attributes(&field.attributes, 4);
    }
    println!();

    println!("Methods:");
    for method in &class_file.methods {
        println!(
            "  {}{} {:?}",
            method.name, method.descriptor, method.access_flags
        );
        print_attributes(&method.attributes, 4);
    }
    println!();

    println!("Attributes:");
    print_attributes(&class_file.attributes, 2);
}

fn print_attributes(attributes: &Attributes, indent: usize) {
    for attribute in attributes {
        match attribute {
            AttributeInfo::Code(code) => {
                println!(
                    "{:indent$}Code: stack={} locals={} {} byte(s)",
                    "",
                    code.max_stack,
                    code.max_locals,
                    code.code.len()
                );
                print_attributes(&code.attributes, indent + 2);
            }
            AttributeInfo::Unknown(unknown) => {
                println!("{:indent$}<{} ({})>", "", unknown.name, unknown.info.len())
            }
            attribute => println!("{:indent$}{:?}", "", attribute),
        }
    }
}
