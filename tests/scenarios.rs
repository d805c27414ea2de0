use argot::{
    check, format, Argument, Cardinality, ConstraintViolation, EvalError, Evaluation, Groups,
    Handler, List, Scalar, Switch,
};

#[test]
fn mandatory_argument_not_used() {
    let mut silent: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("s", Scalar::new(&mut silent)).mandatory());

    let error = handler.eval_tokens(&[]).unwrap_err();

    assert_eq!(error, EvalError::MandatoryNotUsed("-s".to_string()));
}

#[test]
fn multi_value_vector_stream() {
    let mut items: Vec<i32> = Vec::default();
    let handler = Handler::new("program")
        .add(Argument::new("v,vector", List::new(&mut items)).multi_value());

    let evaluation = handler
        .eval_tokens(&["-v", "1,2", "3", "4,5,6", "7", "8", "9"])
        .unwrap();

    assert_eq!(evaluation, Evaluation::Complete);
    assert_eq!(items, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn required_companion_argument() {
    let mut input: u32 = 0;
    let mut opt: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("i", Scalar::new(&mut input)).requires("o,opt"))
        .add(Argument::new("o,opt", Scalar::new(&mut opt)));

    let error = handler.eval_tokens(&["-i", "5"]).unwrap_err();

    assert_eq!(
        error,
        EvalError::Constraint(ConstraintViolation::Requires {
            owner: "-i".to_string(),
            required: "-o,--opt".to_string(),
        })
    );

    let mut input: u32 = 0;
    let mut opt: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("i", Scalar::new(&mut input)).requires("o,opt"))
        .add(Argument::new("o,opt", Scalar::new(&mut opt)));

    handler.eval_tokens(&["-i", "5", "-o", "val"]).unwrap();

    assert_eq!(input, 5);
    assert_eq!(opt, "val");
}

#[test]
fn abbreviation_resolution() {
    let mut input: u32 = 0;
    let mut inplace: bool = false;
    let mut output: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("input", Scalar::new(&mut input)))
        .add(Argument::new("inplace", Switch::new(&mut inplace, true)))
        .add(Argument::new("output", Scalar::new(&mut output)));

    handler.eval_tokens(&["--inpu", "5"]).unwrap();
    assert_eq!(input, 5);

    let mut input: u32 = 0;
    let mut inplace: bool = false;
    let mut output: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("input", Scalar::new(&mut input)))
        .add(Argument::new("inplace", Switch::new(&mut inplace, true)))
        .add(Argument::new("output", Scalar::new(&mut output)));

    let error = handler.eval_tokens(&["--inp", "5"]).unwrap_err();
    assert_eq!(
        error,
        EvalError::AmbiguousArgument {
            argument: "--inp".to_string(),
            candidates: "--inplace, --input".to_string(),
        }
    );
}

#[test]
fn exclusive_arguments() {
    for (tokens, expected_ok) in [
        (vec![], true),
        (vec!["--json"], true),
        (vec!["--yaml"], true),
        (vec!["--json", "--yaml"], false),
    ] {
        let mut json: bool = false;
        let mut yaml: bool = false;
        let handler = Handler::new("program")
            .add(Argument::new("json", Switch::new(&mut json, true)).excludes("yaml"))
            .add(Argument::new("yaml", Switch::new(&mut yaml, true)));

        let result = handler.eval_tokens(tokens.as_slice());
        assert_eq!(result.is_ok(), expected_ok, "tokens: {tokens:?}");
    }
}

#[test]
fn exactly_one_of_a_set() {
    for (tokens, expected_ok) in [
        (vec![], false),
        (vec!["--json"], true),
        (vec!["--yaml"], true),
        (vec!["--json", "--yaml"], false),
    ] {
        let mut json: bool = false;
        let mut yaml: bool = false;
        let handler = Handler::new("program")
            .add(Argument::new("json", Switch::new(&mut json, true)))
            .add(Argument::new("yaml", Switch::new(&mut yaml, true)))
            .one_of(vec!["json", "yaml"]);

        let result = handler.eval_tokens(tokens.as_slice());
        assert_eq!(result.is_ok(), expected_ok, "tokens: {tokens:?}");
    }
}

#[test]
fn exact_cardinality_via_repeats_or_one_token() {
    for (tokens, expected_ok) in [
        (vec!["-c", "1,2,3"], true),
        (vec!["-c", "1", "-c", "2", "-c", "3"], true),
        (vec!["-c", "1,2"], false),
        (vec!["-c", "1,2,3,4"], false),
    ] {
        let mut items: Vec<u32> = Vec::default();
        let handler = Handler::new("program").add(
            Argument::new("c,counted", List::new(&mut items))
                .cardinality(Cardinality::Exact(3)),
        );

        let result = handler.eval_tokens(tokens.as_slice());
        assert_eq!(result.is_ok(), expected_ok, "tokens: {tokens:?}");
    }
}

#[test]
fn checked_and_formatted_values() {
    let mut color: String = String::default();
    let mut level: u32 = 0;
    let handler = Handler::new("program")
        .add(
            Argument::new("c,color", Scalar::new(&mut color))
                .format(format::lowercase())
                .check(check::values(vec![
                    "red".to_string(),
                    "green".to_string(),
                    "blue".to_string(),
                ])),
        )
        .add(Argument::new("l,level", Scalar::new(&mut level)).check(check::range(1, 5)));

    handler.eval_tokens(&["-c", "GREEN", "-l", "3"]).unwrap();

    assert_eq!(color, "green");
    assert_eq!(level, 3);
}

#[test]
fn check_violation_names_argument_and_rule() {
    let mut level: u32 = 0;
    let handler = Handler::new("program")
        .add(Argument::new("l,level", Scalar::new(&mut level)).check(check::range(1, 5)));

    let error = handler.eval_tokens(&["-l", "9"]).unwrap_err();

    assert_eq!(
        error.to_string(),
        "Argument '-l,--level': value 9 is out of range [1, 5]."
    );
}

#[test]
fn filesystem_checks() {
    let directory = tempfile::tempdir().unwrap();
    let present = directory.path().join("input.txt");
    std::fs::write(&present, "x").unwrap();
    let present = present.to_str().unwrap().to_string();

    let mut input: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("i,input", Scalar::new(&mut input)).check(check::is_file()));
    handler.eval_tokens(&["-i", present.as_str()]).unwrap();
    assert_eq!(input, present);

    let missing = directory.path().join("missing.txt");
    let missing = missing.to_str().unwrap().to_string();

    let mut input: String = String::default();
    let handler = Handler::new("program")
        .add(Argument::new("i,input", Scalar::new(&mut input)).check(check::is_file()));
    let error = handler.eval_tokens(&["-i", missing.as_str()]).unwrap_err();
    assert!(matches!(error, EvalError::Check { .. }));
}

#[test]
fn free_values_and_end_of_values_marker() {
    let mut items: Vec<u32> = Vec::default();
    let mut files: Vec<String> = Vec::default();
    let handler = Handler::new("program")
        .add(Argument::new("v,vector", List::new(&mut items)).multi_value())
        .add(Argument::new("-", List::new(&mut files)));

    handler
        .eval_tokens(&["-v", "1", "2", "--endvalues", "a.txt", "b.txt"])
        .unwrap();

    assert_eq!(items, vec![1, 2]);
    assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
}

#[test]
fn sub_group_handlers() {
    let mut fast: bool = false;
    let mut xres: u32 = 0;
    let mut yres: u32 = 0;
    let handler = Handler::new("program")
        .add(Argument::new("f,fast", Switch::new(&mut fast, true)))
        .group(
            "g,gui",
            Handler::new("gui")
                .about("Arguments of the graphical frontend.")
                .add(Argument::new("x,xres", Scalar::new(&mut xres)))
                .add(Argument::new("y,yres", Scalar::new(&mut yres))),
        );

    handler
        .eval_tokens(&["-f", "-g", "-x", "1024", "-y", "768"])
        .unwrap();

    assert!(fast);
    assert_eq!(xres, 1024);
    assert_eq!(yres, 768);
}

#[test]
fn sub_group_unknown_argument_names_the_path() {
    let mut xres: u32 = 0;
    let handler = Handler::new("program").group(
        "g,gui",
        Handler::new("gui").add(Argument::new("x,xres", Scalar::new(&mut xres))),
    );

    let error = handler.eval_tokens(&["-g", "-q"]).unwrap_err();

    assert_eq!(error.to_string(), "Sub-group argument '-g/q' is unknown!");
}

#[test]
fn groups_aggregate_independent_handlers() {
    let mut verbose: bool = false;
    let mut retries: u32 = 0;
    let groups = Groups::new("program")
        .register(
            Handler::new("logging")
                .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))),
        )
        .register(
            Handler::new("network")
                .add(Argument::new("r,retries", Scalar::new(&mut retries))),
        );

    groups.eval_tokens(&["-r", "3", "-v"]).unwrap();

    assert!(verbose);
    assert_eq!(retries, 3);
}

#[test]
fn setup_errors_surface_from_evaluation() {
    let mut a: u32 = 0;
    let mut b: u32 = 0;
    let handler = Handler::new("program")
        .add(Argument::new("v,value", Scalar::new(&mut a)))
        .add(Argument::new("v,volume", Scalar::new(&mut b)));

    let error = handler.eval_tokens(&[]).unwrap_err();

    assert_eq!(
        error.to_string(),
        "Cannot duplicate the argument key '-v,--volume'."
    );
}
